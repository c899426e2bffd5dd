use crate::calc::CalcError;
use actix_web::error::BlockingError;
use actix_web::http::{header::ContentType, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use std::error::Error as _;
use std::fmt;
use tracing::{error, warn};

#[derive(Debug, Clone)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = %self.code, message = %self.message, "request failed");
        } else {
            warn!(code = %self.code, message = %self.message, "request rejected");
        }
        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(format!(
                "<h2>{}</h2><p>{}</p><a href='/'>Volver al inicio</a>",
                status,
                tera::escape_html(&self.message)
            ))
    }
}

impl From<CalcError> for ApiError {
    fn from(e: CalcError) -> Self {
        ApiError {
            code: e.code,
            message: e.message,
        }
    }
}

impl From<tera::Error> for ApiError {
    fn from(e: tera::Error) -> Self {
        // tera keeps the useful part in the source chain
        let mut message = e.to_string();
        let mut source = e.source();
        while let Some(inner) = source {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            source = inner.source();
        }
        ApiError::new("render_failed", message)
    }
}

impl From<BlockingError> for ApiError {
    fn from(e: BlockingError) -> Self {
        ApiError::new("blocking_failed", e.to_string())
    }
}
