use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::validation::{not_blank, validate_email};

/// Request body for user registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(min = 3, max = 100, message = "must be between 3 and 100 characters")
    )]
    pub name: String,
    #[serde(default)]
    #[validate(
        custom(function = "validate_email"),
        length(max = 150, message = "must not exceed 150 characters")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 6, max = 100, message = "must be between 6 and 100 characters"))]
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "must not be blank"))]
    pub password: String,
}

/// Public projection of a freshly registered user.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Response returned after login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in_ms: i64,
}
