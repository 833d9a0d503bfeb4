use actix_web::{http::StatusCode, HttpResponse};
use application::error::AppError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ApiError(#[from] pub AppError);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    // 部分写入时告知前端已创建的播放列表
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks_added: Option<usize>,
}

impl actix_web::error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::NoArtistsFound
            | AppError::NoCatalogMatches
            | AppError::InvalidInput(_)
            | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::Catalog(_) => StatusCode::BAD_GATEWAY,
            AppError::PlaylistWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        let body = match &self.0 {
            AppError::PlaylistWrite {
                message,
                playlist_url,
                tracks_added,
            } => ErrorResponse {
                error: message.clone(),
                playlist_url: playlist_url.clone(),
                tracks_added: Some(*tracks_added),
            },
            // 维持前端依赖的原始错误文案
            AppError::InvalidInput(message) | AppError::Upload(message) => ErrorResponse {
                error: message.clone(),
                playlist_url: None,
                tracks_added: None,
            },
            other => ErrorResponse {
                error: other.to_string(),
                playlist_url: None,
                tracks_added: None,
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
