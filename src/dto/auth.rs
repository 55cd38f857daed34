use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::validate_phone_number;

#[derive(Deserialize, Debug, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCustomerRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(must_match(other = "password", message = "does not match password"))]
    pub confirm_password: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "is required"))]
    pub address: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerLoginRequest {
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Deserialize, Debug, ToSchema, Validate)]
pub struct EmployeeLoginRequest {
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}
