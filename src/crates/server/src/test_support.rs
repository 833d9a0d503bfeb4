//! Stub adapters and request helpers for the handler tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use application::catalog::{CatalogAuthorizer, CatalogClient, CatalogError};
use application::vision::{VisionClient, VisionError};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use domain::playlist::{CreatedPlaylist, NewPlaylist};
use domain::session::AuthSession;
use domain::user::CatalogUser;
use domain::value::{CatalogArtistId, CatalogPlaylistId, CatalogUserId, TrackUri};
use infra::config::{AppConfigImpl, UploadConfig};
use infra::{InMemorySessionStore, UploadStorage};
use std::sync::Arc;
use tempfile::TempDir;

use crate::AppState;

pub const BOUNDARY: &str = "----lineup-test-boundary";

/// 授权码为 `bad` 时换取失败
pub struct StubAuthorizer;

#[async_trait]
impl CatalogAuthorizer for StubAuthorizer {
    fn authorize_url(&self) -> Result<String, CatalogError> {
        Ok("https://accounts.spotify.com/authorize?client_id=test".to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<AuthSession, CatalogError> {
        if code == "bad" {
            return Err(CatalogError::Api("invalid_grant".to_string()));
        }
        Ok(AuthSession::new(
            &format!("access-{}", code),
            "refresh",
            Utc::now() + Duration::hours(1),
        ))
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, CatalogError> {
        Ok(session.clone())
    }
}

#[derive(Default)]
pub struct StubCatalog {
    // 艺人名 -> 曲目数
    artists: HashMap<String, usize>,
    unauthorized: bool,
    calls: Mutex<Vec<String>>,
}

impl StubCatalog {
    pub fn with_artist(mut self, name: &str, tracks: usize) -> Self {
        self.artists.insert(name.to_string(), tracks);
        self
    }

    /// 所有调用都返回 401
    pub fn unauthorized() -> Self {
        Self {
            unauthorized: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), CatalogError> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.unauthorized {
            return Err(CatalogError::Unauthorized("401 Unauthorized".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogClient for StubCatalog {
    async fn search_artist(
        &self,
        _session: &AuthSession,
        name: &str,
    ) -> Result<Option<CatalogArtistId>, CatalogError> {
        self.record("search")?;
        Ok(self
            .artists
            .contains_key(name)
            .then(|| CatalogArtistId::from(name)))
    }

    async fn top_tracks(
        &self,
        _session: &AuthSession,
        artist_id: &CatalogArtistId,
    ) -> Result<Vec<TrackUri>, CatalogError> {
        self.record("top_tracks")?;
        let count = self.artists.get(artist_id.as_str()).copied().unwrap_or(0);
        Ok((0..count)
            .map(|n| TrackUri::from(format!("spotify:track:{}{}", artist_id, n)))
            .collect())
    }

    async fn current_user(&self, _session: &AuthSession) -> Result<CatalogUser, CatalogError> {
        self.record("current_user")?;
        Ok(CatalogUser::new(CatalogUserId::from("user-1"), Some("Test User")))
    }

    async fn create_playlist(
        &self,
        _session: &AuthSession,
        _owner: &CatalogUserId,
        _playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError> {
        self.record("create_playlist")?;
        Ok(CreatedPlaylist {
            id: CatalogPlaylistId::from("pl-1"),
            url: "https://open.spotify.com/playlist/pl-1".to_string(),
        })
    }

    async fn add_tracks(
        &self,
        _session: &AuthSession,
        _playlist_id: &CatalogPlaylistId,
        _tracks: &[TrackUri],
    ) -> Result<(), CatalogError> {
        self.record("add_tracks")
    }
}

pub struct StubVision {
    answer: String,
    calls: Mutex<usize>,
}

impl StubVision {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl VisionClient for StubVision {
    async fn describe_lineup(&self, image_path: &Path) -> Result<String, VisionError> {
        *self.calls.lock().unwrap() += 1;
        // 上传文件在识别期间必须存在
        tokio::fs::metadata(image_path).await?;
        Ok(self.answer.clone())
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub upload_dir: TempDir,
}

pub fn context(catalog: Arc<StubCatalog>, vision: Arc<StubVision>) -> TestContext {
    let upload_dir = TempDir::new().unwrap();
    let app_cfg = AppConfigImpl::default();
    let store = Arc::new(InMemorySessionStore::new(&app_cfg.session()));
    let mut state = AppState::with_adapters(
        app_cfg,
        store,
        Arc::new(StubAuthorizer),
        catalog,
        vision,
    );
    state.uploads = UploadStorage::new(&UploadConfig {
        dir: upload_dir.path().to_string_lossy().to_string(),
        max_bytes: 1024,
    });
    TestContext {
        state: web::Data::new(state),
        upload_dir,
    }
}

pub async fn init_app(
    ctx: &TestContext,
) -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(ctx.state.clone())
            .configure(crate::configure_service),
    )
    .await
}

pub fn session_cookie(rsp: &ServiceResponse) -> Option<Cookie<'static>> {
    rsp.response()
        .cookies()
        .find(|c| c.name() == "sid")
        .map(|c| c.into_owned())
}

/// 走一遍 OAuth 回调，返回已登录的会话 cookie
pub async fn login<S>(app: &S) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::get()
        .uri("/api/callback?code=ok")
        .to_request();
    let rsp = test::call_service(app, req).await;
    session_cookie(&rsp).unwrap()
}

pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub fn dir_is_empty(dir: &TempDir) -> bool {
    std::fs::read_dir(dir.path()).unwrap().next().is_none()
}
