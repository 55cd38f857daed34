use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::validate_phone_number;
use crate::{entity::employees::EmployeeRole, models::Employee};

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterEmployeeRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[serde(alias = "passwordConfirm")]
    #[validate(must_match(other = "password", message = "does not match password"))]
    pub confirm_password: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "is required"))]
    pub address: String,
    pub image: Option<String>,
    /// Defaults to `staff`.
    #[serde(rename = "type")]
    pub role: Option<EmployeeRole>,
}

#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub username: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
    #[validate(length(min = 1, message = "is required"))]
    pub address: String,
    pub image: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredEmployee {
    pub employee: Employee,
    pub access_token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct EmployeeList {
    #[schema(value_type = Vec<Employee>)]
    pub items: Vec<Employee>,
}
