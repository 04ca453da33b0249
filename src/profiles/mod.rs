use serde::{Deserialize, Serialize};

use crate::dweets::DweetResponse;

pub mod handler;
pub mod hooks;

/// Database model for a profile. One per user, created by `hooks::on_user_saved`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
}

/// Entry in profile listings and in follows/followed-by lists
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ProfileSummary {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub followers_count: i64,
    pub following_count: i64,
}

/// Full profile page context
#[derive(Debug, Serialize)]
pub struct ProfileDetailResponse {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub follows: Vec<ProfileSummary>,
    pub followed_by: Vec<ProfileSummary>,
    pub dweets: Vec<DweetResponse>,
    pub is_following: bool,
}

/// Form posted to a profile page to change the viewer's follow edge
#[derive(Debug, Deserialize)]
pub struct FollowForm {
    #[serde(default)]
    pub follow: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    Follow,
    Unfollow,
}

impl FollowAction {
    /// Anything other than the two known actions is ignored by the caller.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "follow" => Some(FollowAction::Follow),
            "unfollow" => Some(FollowAction::Unfollow),
            _ => None,
        }
    }
}
