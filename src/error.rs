//! Error types for the dashboard

use std::io::Cursor;

use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("Fixture parsing failed: {0}")]
    Fixture(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

impl DashboardError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        DashboardError::NotFound { kind, id: id.into() }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        DashboardError::Validation(message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            DashboardError::TopicNotFound(_) | DashboardError::NotFound { .. } => Status::NotFound,
            DashboardError::Validation(_) => Status::UnprocessableEntity,
            DashboardError::Fixture(_) | DashboardError::Export(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for DashboardError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.code, "request rejected");
        }

        let body = serde_json::json!({ "error": self.to_string() }).to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}
