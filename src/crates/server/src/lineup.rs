use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use application::command::playlist::CreatePlaylistCmd;
use application::error::AppError;
use domain::lineup::DEFAULT_EVENT_NAME;
use domain::playlist::PlaylistResult;
use futures::StreamExt;
use infra::{ScopedUpload, UploadStorage};
use log::info;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::ApiError;
use crate::middleware::session::RequestSession;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub event_name: String,
    pub artists: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    #[serde(default = "default_event_name")]
    pub event_name: String,
    #[serde(default)]
    pub artists: Vec<String>,
}

fn default_event_name() -> String {
    DEFAULT_EVENT_NAME.to_string()
}

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub success: bool,
    pub playlist_url: String,
    pub playlist_name: String,
    pub artists_found: Vec<String>,
    pub tracks_added: usize,
}

impl From<PlaylistResult> for PlaylistResponse {
    fn from(result: PlaylistResult) -> Self {
        Self {
            success: true,
            playlist_url: result.playlist_url,
            playlist_name: result.playlist_name,
            artists_found: result.artists_found,
            tracks_added: result.tracks_added,
        }
    }
}

fn upload_error(e: impl std::fmt::Display) -> ApiError {
    AppError::Upload(e.to_string()).into()
}

/// 把 multipart 中的 `file` 字段写入临时文件，其余字段忽略
async fn receive_upload(
    storage: &UploadStorage,
    mut payload: Multipart,
) -> Result<ScopedUpload, ApiError> {
    while let Some(field) = payload.next().await {
        let mut field = field.map_err(upload_error)?;
        if field.name() != Some(consts::UPLOAD_FIELD_NAME) {
            continue;
        }
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|name| name.trim().to_string())
            .unwrap_or_default();
        if filename.is_empty() {
            return Err(upload_error("No file selected"));
        }

        let mut upload = storage.create(Some(&filename))?;
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(upload_error)?;
            upload.write_chunk(&chunk)?;
        }
        upload.finish()?;
        if upload.is_empty() {
            return Err(upload_error("Uploaded file is empty"));
        }
        info!("received upload '{}' ({} bytes)", filename, upload.len());
        return Ok(upload);
    }
    Err(upload_error("No file uploaded"))
}

/// 识别海报，返回活动名和艺人列表供用户确认
pub async fn extract(
    state: web::Data<AppState>,
    session: RequestSession,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    // 读取上传内容之前先检查登录状态
    state.auth.active_session(&session.0).await?;

    let upload = receive_upload(&state.uploads, payload).await?;
    let lineup = state.extraction.extract_lineup(upload.path()).await?;
    drop(upload);

    let (event_name, artists) = lineup.into_parts();
    Ok(HttpResponse::Ok().json(ExtractResponse {
        success: true,
        event_name,
        artists,
    }))
}

/// 根据用户确认后的艺人列表创建播放列表
pub async fn create_playlist(
    state: web::Data<AppState>,
    session: RequestSession,
    body: web::Json<CreatePlaylistRequest>,
) -> Result<HttpResponse, ApiError> {
    let auth_session = state.auth.active_session(&session.0).await?;

    let body = body.into_inner();
    if body.artists.is_empty() {
        return Err(AppError::InvalidInput("No artists provided".to_string()).into());
    }
    let cmd = CreatePlaylistCmd::new(&body.event_name, body.artists);
    let result = state.auth.guard(
        &session.0,
        state.playlists.create_playlist(&auth_session, cmd).await,
    )?;
    Ok(HttpResponse::Ok().json(PlaylistResponse::from(result)))
}

/// 一步完成：识别海报并直接创建播放列表
pub async fn upload(
    state: web::Data<AppState>,
    session: RequestSession,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let auth_session = state.auth.active_session(&session.0).await?;

    let upload = receive_upload(&state.uploads, payload).await?;
    let lineup = state.extraction.extract_lineup(upload.path()).await?;
    drop(upload);

    let (event_name, artists) = lineup.into_parts();
    let cmd = CreatePlaylistCmd::new(&event_name, artists);
    let result = state.auth.guard(
        &session.0,
        state.playlists.create_playlist(&auth_session, cmd).await,
    )?;
    Ok(HttpResponse::Ok().json(PlaylistResponse::from(result)))
}

pub fn configure_service(svc: &mut web::ServiceConfig) {
    svc.route("/extract", web::post().to(extract))
        .route("/create-playlist", web::post().to(create_playlist))
        .route("/upload", web::post().to(upload));
}
