use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// Pagination block of list responses.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    #[serde(rename = "_page")]
    pub page: u64,
    #[serde(rename = "_limit")]
    pub limit: u64,
    #[serde(rename = "_totalRecords")]
    pub total_records: u64,
}

impl Meta {
    pub fn new(page: u64, limit: u64, total_records: u64) -> Self {
        Self {
            page,
            limit,
            total_records,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }
    }

    pub fn page(data: T, meta: Meta) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
            pagination: Some(meta),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Some(message.into()),
            data: None,
            pagination: None,
        }
    }
}
