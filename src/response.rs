use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub total: Option<i64>,
}

impl Meta {
    pub fn empty() -> Self {
        Self { total: None }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
            meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum Status {
    Success,
    Error,
    Unauthorized,
    #[serde(rename = "Internal Server Error")]
    InternalServerError,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorMessage {
    pub message: String,
}

/// Body shape of the `/api/reups` REST endpoints: `{status, data}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct JsonEnvelope<T> {
    pub status: Status,
    pub data: T,
}

impl<T: Serialize> JsonEnvelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: Status::Success,
            data,
        }
    }
}

impl JsonEnvelope<ErrorMessage> {
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_status(Status::Error, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::with_status(Status::Unauthorized, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_status(Status::InternalServerError, message)
    }

    fn with_status(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            data: ErrorMessage {
                message: message.into(),
            },
        }
    }
}
