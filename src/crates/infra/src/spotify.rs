use std::collections::HashSet;

use application::catalog::{CatalogAuthorizer, CatalogClient, CatalogError};
use async_trait::async_trait;
use chrono::Utc;
use domain::playlist::{CreatedPlaylist, NewPlaylist};
use domain::session::AuthSession;
use domain::user::CatalogUser;
use domain::value::{CatalogArtistId, CatalogPlaylistId, CatalogUserId, TrackUri};
use log::debug;
use rspotify::{
    http::HttpError,
    model::{
        ArtistId, Market, PlayableId, PlaylistId, SearchResult, SearchType, TrackId, UserId,
    },
    prelude::*,
    AuthCodeSpotify, ClientError, Credentials, OAuth, Token,
};

use crate::config::SpotifyConfig;

/// Spotify Web API 适配器
///
/// 不持有任何令牌：每次调用都用传入的 [`AuthSession`] 构造一个临时客户端。
#[derive(Debug, Clone)]
pub struct SpotifyCatalog {
    config: SpotifyConfig,
}

impl SpotifyCatalog {
    pub fn new(config: SpotifyConfig) -> Self {
        Self { config }
    }

    fn scopes(&self) -> HashSet<String> {
        self.config.scopes.iter().cloned().collect()
    }

    // 带应用凭据的客户端，用于授权 URL、换取和刷新令牌
    fn oauth_client(&self) -> AuthCodeSpotify {
        let creds = Credentials::new(&self.config.client_id, &self.config.client_secret);
        let oauth = OAuth {
            redirect_uri: self.config.redirect_uri.clone(),
            scopes: self.scopes(),
            ..Default::default()
        };
        AuthCodeSpotify::new(creds, oauth)
    }

    fn user_client(&self, session: &AuthSession) -> AuthCodeSpotify {
        AuthCodeSpotify::from_token(self.to_token(session))
    }

    fn to_token(&self, session: &AuthSession) -> Token {
        let refresh_token = Some(session.refresh_token.clone()).filter(|t| !t.is_empty());
        Token {
            access_token: session.access_token.clone(),
            expires_in: session.expiry - Utc::now(),
            expires_at: Some(session.expiry),
            refresh_token,
            scopes: self.scopes(),
        }
    }
}

fn token_expiry(token: &Token) -> chrono::DateTime<Utc> {
    token
        .expires_at
        .unwrap_or_else(|| Utc::now() + token.expires_in)
}

async fn current_token(client: &AuthCodeSpotify) -> Result<Token, CatalogError> {
    let guard = client
        .token
        .lock()
        .await
        .map_err(|_| CatalogError::Api("token lock poisoned".to_string()))?;
    guard
        .clone()
        .ok_or_else(|| CatalogError::Unauthorized("no token returned".to_string()))
}

fn map_client_error(err: ClientError) -> CatalogError {
    match err {
        ClientError::Http(http) => match *http {
            HttpError::StatusCode(response) => status_error(response.status().as_u16()),
            HttpError::Client(e) => CatalogError::Transport(e.to_string()),
        },
        ClientError::InvalidToken => CatalogError::Unauthorized("invalid token".to_string()),
        other => CatalogError::Api(other.to_string()),
    }
}

fn status_error(status: u16) -> CatalogError {
    match status {
        401 => CatalogError::Unauthorized(format!("status code {}", status)),
        429 => CatalogError::RateLimited,
        _ => CatalogError::Api(format!("status code {}", status)),
    }
}

fn invalid_id(err: impl std::fmt::Display) -> CatalogError {
    CatalogError::InvalidId(err.to_string())
}

#[async_trait]
impl CatalogAuthorizer for SpotifyCatalog {
    fn authorize_url(&self) -> Result<String, CatalogError> {
        self.oauth_client()
            .get_authorize_url(self.config.show_dialog)
            .map_err(map_client_error)
    }

    async fn exchange_code(&self, code: &str) -> Result<AuthSession, CatalogError> {
        let client = self.oauth_client();
        client.request_token(code).await.map_err(map_client_error)?;
        let token = current_token(&client).await?;
        Ok(AuthSession::new(
            &token.access_token,
            token.refresh_token.as_deref().unwrap_or_default(),
            token_expiry(&token),
        ))
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, CatalogError> {
        if session.refresh_token.is_empty() {
            return Err(CatalogError::Unauthorized("no refresh token".to_string()));
        }
        let client = self.oauth_client();
        {
            let mut guard = client
                .token
                .lock()
                .await
                .map_err(|_| CatalogError::Api("token lock poisoned".to_string()))?;
            *guard = Some(self.to_token(session));
        }
        client.refresh_token().await.map_err(map_client_error)?;
        let token = current_token(&client).await?;
        Ok(session.refreshed(
            &token.access_token,
            token.refresh_token.as_deref(),
            token_expiry(&token),
        ))
    }
}

#[async_trait]
impl CatalogClient for SpotifyCatalog {
    async fn search_artist(
        &self,
        session: &AuthSession,
        name: &str,
    ) -> Result<Option<CatalogArtistId>, CatalogError> {
        let query = format!("artist:{}", name);
        let result = self
            .user_client(session)
            .search(&query, SearchType::Artist, None, None, Some(1), None)
            .await
            .map_err(map_client_error)?;
        let id = match result {
            SearchResult::Artists(page) => page
                .items
                .into_iter()
                .next()
                .map(|artist| CatalogArtistId::from(artist.id.id())),
            _ => None,
        };
        debug!("search '{}' -> {:?}", query, id);
        Ok(id)
    }

    async fn top_tracks(
        &self,
        session: &AuthSession,
        artist_id: &CatalogArtistId,
    ) -> Result<Vec<TrackUri>, CatalogError> {
        let artist_id = ArtistId::from_id(artist_id.as_str()).map_err(invalid_id)?;
        let tracks = self
            .user_client(session)
            .artist_top_tracks(artist_id, Some(Market::FromToken))
            .await
            .map_err(map_client_error)?;
        Ok(tracks
            .into_iter()
            .filter_map(|track| track.id)
            .map(|id| TrackUri::from(id.uri()))
            .collect())
    }

    async fn current_user(&self, session: &AuthSession) -> Result<CatalogUser, CatalogError> {
        let user = self
            .user_client(session)
            .current_user()
            .await
            .map_err(map_client_error)?;
        Ok(CatalogUser::new(
            CatalogUserId::from(user.id.id()),
            user.display_name.as_deref(),
        ))
    }

    async fn create_playlist(
        &self,
        session: &AuthSession,
        owner: &CatalogUserId,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError> {
        let user_id = UserId::from_id(owner.as_str()).map_err(invalid_id)?;
        let created = self
            .user_client(session)
            .user_playlist_create(
                user_id,
                &playlist.name,
                Some(playlist.public),
                Some(false),
                Some(playlist.description.as_str()),
            )
            .await
            .map_err(map_client_error)?;
        let url = created
            .external_urls
            .get("spotify")
            .cloned()
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", created.id.id()));
        Ok(CreatedPlaylist {
            id: CatalogPlaylistId::from(created.id.id()),
            url,
        })
    }

    async fn add_tracks(
        &self,
        session: &AuthSession,
        playlist_id: &CatalogPlaylistId,
        tracks: &[TrackUri],
    ) -> Result<(), CatalogError> {
        let playlist_id = PlaylistId::from_id(playlist_id.as_str()).map_err(invalid_id)?;
        let items = tracks
            .iter()
            .map(|uri| TrackId::from_uri(uri.as_str()).map(PlayableId::Track))
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid_id)?;
        self.user_client(session)
            .playlist_add_items(playlist_id, items, None)
            .await
            .map_err(map_client_error)?;
        Ok(())
    }
}
