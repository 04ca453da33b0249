use anyhow::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use super::PASSWORD_MIN_LEN;

const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "password", "password1", "password123",
    "qwerty", "qwertyuiop", "qwerty123", "abc123", "111111", "000000", "iloveyou", "admin",
    "letmein", "welcome", "monkey", "dragon", "football", "baseball", "sunshine", "princess",
    "trustno1", "superman", "starwars", "passw0rd", "master", "whatever", "shadow",
    "michael", "1q2w3e4r", "zaq12wsx", "computer", "internet", "changeme",
];

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(hash: &str, password: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

/// Password policy applied at registration. Returns the first rule broken.
pub fn check_password_rules(password: &str, username: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err("This password is too short. It must contain at least 8 characters.");
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("This password is entirely numeric.");
    }
    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        return Err("This password is too common.");
    }
    let username = username.to_lowercase();
    if username.len() >= 3 && (lowered.contains(&username) || username.contains(&lowered)) {
        return Err("The password is too similar to the username.");
    }
    Ok(())
}
