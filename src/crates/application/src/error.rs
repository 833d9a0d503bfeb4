use crate::catalog::CatalogError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("No artists found in image")]
    NoArtistsFound,
    #[error("Could not find any artists on Spotify")]
    NoCatalogMatches,
    // 播放列表写入失败，已写入的部分不回滚
    #[error("Playlist write error: {message}")]
    PlaylistWrite {
        message: String,
        playlist_url: Option<String>,
        tracks_added: usize,
    },
    #[error("Catalog error: {0}")]
    Catalog(CatalogError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Upload error: {0}")]
    Upload(String),
}

impl AppError {
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Unauthenticated)
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unauthorized(_) => AppError::Unauthenticated,
            other => AppError::Catalog(other),
        }
    }
}
