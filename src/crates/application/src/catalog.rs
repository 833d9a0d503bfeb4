use async_trait::async_trait;
use domain::playlist::{CreatedPlaylist, NewPlaylist};
use domain::session::AuthSession;
use domain::user::CatalogUser;
use domain::value::{CatalogArtistId, CatalogPlaylistId, CatalogUserId, TrackUri};
use thiserror::Error;

/// 曲库调用错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("access token rejected: {0}")]
    Unauthorized(String),
    #[error("rate limited by catalog")]
    RateLimited,
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("{0}")]
    Api(String),
    #[error("invalid catalog id: {0}")]
    InvalidId(String),
}

/// 曲库读写接口
///
/// 每个调用都显式接收当前 Web 会话的 [`AuthSession`]，
/// 适配器自己负责拼装鉴权头。
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// `artist:<name>` 精确搜索，只取第一条；没有命中返回 `None`
    async fn search_artist(
        &self,
        session: &AuthSession,
        name: &str,
    ) -> Result<Option<CatalogArtistId>, CatalogError>;

    /// 艺人热门曲目 URI，保持曲库返回的顺序，可能为空
    async fn top_tracks(
        &self,
        session: &AuthSession,
        artist_id: &CatalogArtistId,
    ) -> Result<Vec<TrackUri>, CatalogError>;

    async fn current_user(&self, session: &AuthSession) -> Result<CatalogUser, CatalogError>;

    async fn create_playlist(
        &self,
        session: &AuthSession,
        owner: &CatalogUserId,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError>;

    /// 调用方保证 `tracks` 不超过单次批量上限
    async fn add_tracks(
        &self,
        session: &AuthSession,
        playlist_id: &CatalogPlaylistId,
        tracks: &[TrackUri],
    ) -> Result<(), CatalogError>;
}

/// 曲库 OAuth 授权接口
#[async_trait]
pub trait CatalogAuthorizer: Send + Sync {
    fn authorize_url(&self) -> Result<String, CatalogError>;

    /// 用授权码换取令牌
    async fn exchange_code(&self, code: &str) -> Result<AuthSession, CatalogError>;

    /// 用 refresh token 换取新的 access token
    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, CatalogError>;
}
