use serde::{Deserialize, Serialize};
use validator::Validate;

pub mod handler;

/// Database model for a dweet
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Dweet {
    pub id: i64,
    pub user_id: i64,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The only client-editable part of a dweet. The author comes from the
/// session; unknown fields such as `user_id` are dropped by deserialization.
#[derive(Debug, Deserialize, Validate)]
pub struct DweetForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 140, message = "Dweet must be between 1 and 140 characters"))]
    pub body: String,
}

impl DweetForm {
    /// Leading and trailing whitespace is not part of the dweet.
    pub fn cleaned(self) -> Self {
        DweetForm {
            body: self.body.trim().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DweetAuthor {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct DweetResponse {
    pub id: i64,
    pub author: DweetAuthor,
    pub body: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Query parameters for paginated dweet lists
#[derive(Debug, Default, Deserialize)]
pub struct FeedFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FeedFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Dashboard context: the feed plus its page position
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub dweets: Vec<DweetResponse>,
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_length_is_counted_in_characters() {
        let form = DweetForm {
            body: "é".repeat(140),
        };
        assert!(form.validate().is_ok());

        let form = DweetForm {
            body: "é".repeat(141),
        };
        assert!(form.validate().is_err());
    }

    #[test]
    fn whitespace_only_body_is_rejected_after_cleaning() {
        let form = DweetForm {
            body: "   \n ".to_string(),
        }
        .cleaned();
        assert!(form.validate().is_err());
    }

    #[test]
    fn cleaning_trims_the_body() {
        let form = DweetForm {
            body: "  hello  ".to_string(),
        }
        .cleaned();
        assert_eq!(form.body, "hello");
    }

    #[test]
    fn feed_filter_bounds() {
        let filter = FeedFilter {
            limit: Some(500),
            offset: Some(-3),
        };
        assert_eq!(filter.limit(), 100);
        assert_eq!(filter.offset(), 0);
        assert_eq!(FeedFilter::default().limit(), 20);
    }
}
