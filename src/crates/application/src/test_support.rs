//! In-process fakes for the application ports, shared by the service tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use domain::playlist::{CreatedPlaylist, NewPlaylist};
use domain::session::AuthSession;
use domain::user::CatalogUser;
use domain::value::{CatalogArtistId, CatalogPlaylistId, CatalogUserId, SessionId, TrackUri};

use crate::auth::SessionStore;
use crate::catalog::{CatalogAuthorizer, CatalogClient, CatalogError};
use crate::vision::{VisionClient, VisionError};

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<SessionId, AuthSession>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &SessionId) -> Option<AuthSession> {
        self.sessions.lock().unwrap().get(id).cloned()
    }

    fn save(&self, id: &SessionId, session: AuthSession) {
        self.sessions.lock().unwrap().insert(id.clone(), session);
    }

    fn remove(&self, id: &SessionId) {
        self.sessions.lock().unwrap().remove(id);
    }
}

#[derive(Default)]
pub struct FakeAuthorizer {
    fail_refresh: bool,
    exchanges: Mutex<usize>,
    refreshes: Mutex<usize>,
}

impl FakeAuthorizer {
    pub fn failing_refresh() -> Self {
        Self {
            fail_refresh: true,
            ..Default::default()
        }
    }

    pub fn exchange_calls(&self) -> usize {
        *self.exchanges.lock().unwrap()
    }

    pub fn refresh_calls(&self) -> usize {
        *self.refreshes.lock().unwrap()
    }
}

#[async_trait]
impl CatalogAuthorizer for FakeAuthorizer {
    fn authorize_url(&self) -> Result<String, CatalogError> {
        Ok("https://accounts.example.com/authorize?client_id=test".to_string())
    }

    async fn exchange_code(&self, code: &str) -> Result<AuthSession, CatalogError> {
        *self.exchanges.lock().unwrap() += 1;
        Ok(AuthSession::new(
            &format!("access-{}", code),
            "refresh",
            Utc::now() + Duration::hours(1),
        ))
    }

    async fn refresh(&self, session: &AuthSession) -> Result<AuthSession, CatalogError> {
        *self.refreshes.lock().unwrap() += 1;
        if self.fail_refresh {
            return Err(CatalogError::Unauthorized("invalid_grant".to_string()));
        }
        Ok(session.refreshed(
            &format!("refreshed-{}", session.access_token),
            None,
            Utc::now() + Duration::hours(1),
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    Search(String),
    TopTracks(String),
    CurrentUser,
    CreatePlaylist(NewPlaylist),
    AddTracks(Vec<TrackUri>),
}

#[derive(Default)]
struct FakeCatalogState {
    artists: HashMap<String, String>,
    tracks: HashMap<String, Vec<String>>,
    search_errors: HashMap<String, CatalogError>,
    top_tracks_errors: HashMap<String, CatalogError>,
    current_user_error: Option<CatalogError>,
    create_error: Option<CatalogError>,
    // 第 n 次（从 0 开始）添加曲目时失败
    add_error_at: Option<(usize, CatalogError)>,
    add_attempts: usize,
    calls: Vec<CatalogCall>,
}

/// Scripted catalog that records every call it receives
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<FakeCatalogState>,
}

impl FakeCatalog {
    /// 注册一个艺人及其热门曲目，曲目 URI 为 `spotify:track:<id>-<n>`
    pub fn with_artist(self, name: &str, id: &str, track_count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.artists.insert(name.to_string(), id.to_string());
            state.tracks.insert(
                id.to_string(),
                (0..track_count)
                    .map(|n| format!("spotify:track:{}-{}", id, n))
                    .collect(),
            );
        }
        self
    }

    pub fn fail_search(&self, name: &str, err: CatalogError) {
        self.state
            .lock()
            .unwrap()
            .search_errors
            .insert(name.to_string(), err);
    }

    pub fn fail_top_tracks(&self, id: &str, err: CatalogError) {
        self.state
            .lock()
            .unwrap()
            .top_tracks_errors
            .insert(id.to_string(), err);
    }

    pub fn fail_current_user(&self, err: CatalogError) {
        self.state.lock().unwrap().current_user_error = Some(err);
    }

    pub fn fail_create(&self, err: CatalogError) {
        self.state.lock().unwrap().create_error = Some(err);
    }

    pub fn fail_add_at(&self, call_index: usize, err: CatalogError) {
        self.state.lock().unwrap().add_error_at = Some((call_index, err));
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&CatalogCall) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    pub fn add_attempts(&self) -> usize {
        self.state.lock().unwrap().add_attempts
    }

    /// 成功添加的批次
    pub fn added_batches(&self) -> Vec<Vec<TrackUri>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CatalogCall::AddTracks(batch) => Some(batch),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn search_artist(
        &self,
        _session: &AuthSession,
        name: &str,
    ) -> Result<Option<CatalogArtistId>, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CatalogCall::Search(name.to_string()));
        if let Some(err) = state.search_errors.get(name) {
            return Err(err.clone());
        }
        Ok(state
            .artists
            .get(name)
            .map(|id| CatalogArtistId::from(id.as_str())))
    }

    async fn top_tracks(
        &self,
        _session: &AuthSession,
        artist_id: &CatalogArtistId,
    ) -> Result<Vec<TrackUri>, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state
            .calls
            .push(CatalogCall::TopTracks(artist_id.to_string()));
        if let Some(err) = state.top_tracks_errors.get(artist_id.as_str()) {
            return Err(err.clone());
        }
        Ok(state
            .tracks
            .get(artist_id.as_str())
            .map(|uris| uris.iter().map(|u| TrackUri::from(u.as_str())).collect())
            .unwrap_or_default())
    }

    async fn current_user(&self, _session: &AuthSession) -> Result<CatalogUser, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CatalogCall::CurrentUser);
        if let Some(err) = &state.current_user_error {
            return Err(err.clone());
        }
        Ok(CatalogUser::new(
            CatalogUserId::from("user-1"),
            Some("Test User"),
        ))
    }

    async fn create_playlist(
        &self,
        _session: &AuthSession,
        _owner: &CatalogUserId,
        playlist: &NewPlaylist,
    ) -> Result<CreatedPlaylist, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(CatalogCall::CreatePlaylist(playlist.clone()));
        if let Some(err) = &state.create_error {
            return Err(err.clone());
        }
        Ok(CreatedPlaylist {
            id: CatalogPlaylistId::from("pl-1"),
            url: "https://open.spotify.com/playlist/pl-1".to_string(),
        })
    }

    async fn add_tracks(
        &self,
        _session: &AuthSession,
        _playlist_id: &CatalogPlaylistId,
        tracks: &[TrackUri],
    ) -> Result<(), CatalogError> {
        let mut state = self.state.lock().unwrap();
        let attempt = state.add_attempts;
        state.add_attempts += 1;
        if let Some((at, err)) = &state.add_error_at {
            if *at == attempt {
                return Err(err.clone());
            }
        }
        state.calls.push(CatalogCall::AddTracks(tracks.to_vec()));
        Ok(())
    }
}

/// Vision fake returning a canned answer and remembering which files it saw
pub struct FakeVision {
    answer: Result<String, String>,
    seen: Mutex<Vec<PathBuf>>,
}

impl FakeVision {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Ok(text.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl VisionClient for FakeVision {
    async fn describe_lineup(&self, image_path: &Path) -> Result<String, VisionError> {
        self.seen.lock().unwrap().push(image_path.to_path_buf());
        self.answer.clone().map_err(VisionError::Http)
    }
}
