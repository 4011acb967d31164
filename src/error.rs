use std::fmt;

use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseError {
    /// Missing or malformed input.
    Validation(String),
    /// No expense with this id.
    NotFound(i64),
    /// The underlying query failed; the message is passed through to the client.
    Storage(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ExpenseError {
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Storage(_) => Status::InternalServerError,
        }
    }
}

impl fmt::Display for ExpenseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(message) | Self::Storage(message) => f.write_str(message),
            Self::NotFound(_) => f.write_str("Expense not found"),
        }
    }
}

impl std::error::Error for ExpenseError {}

impl From<anyhow::Error> for ExpenseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

impl<'r> Responder<'r, 'static> for ExpenseError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            Self::Storage(message) => log::error!("{} {}: {message}", req.method(), req.uri()),
            Self::NotFound(id) => log::info!("{} {}: no expense {id}", req.method(), req.uri()),
            Self::Validation(_) => {}
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (self.status(), body).respond_to(req)
    }
}
