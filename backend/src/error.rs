use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use shuffle_core::{types::ErrorBody, CatalogError};
use thiserror::Error;
use tracing::error;

use crate::persistence::model::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Store(StoreError::DuplicateArtistName(_)) => Status::Conflict,
            ApiError::Store(StoreError::UnknownArtist(_)) => Status::UnprocessableEntity,
            ApiError::Store(StoreError::ArtistNotFound(_) | StoreError::SongNotFound(_)) => {
                Status::NotFound
            }
            ApiError::Store(StoreError::Database(_)) => Status::InternalServerError,
            ApiError::Catalog(CatalogError::CatalogUnavailable(_)) => Status::ServiceUnavailable,
            ApiError::InvalidCredentials => Status::Unauthorized,
            ApiError::InvalidInput(_) => Status::UnprocessableEntity,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            error!("{} {} failed: {}", request.method(), request.uri(), self);
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).respond_to(request)
    }
}
