use std::sync::Arc;

use crate::catalog::{CatalogClient, CatalogError};
use crate::error::AppError;
use chrono::Local;
use domain::lineup::DEFAULT_EVENT_NAME;
use domain::playlist::{
    track_batches, ArtistMatch, NewPlaylist, PlaylistResult, TOP_TRACKS_PER_ARTIST,
};
use domain::session::AuthSession;
use domain::value::TrackUri;
use log::{debug, info, warn};

/// 根据艺人列表创建播放列表的命令
#[derive(Debug, Clone)]
pub struct CreatePlaylistCmd {
    pub event_name: String,
    pub artists: Vec<String>,
}

impl CreatePlaylistCmd {
    pub fn new(event_name: &str, artists: Vec<String>) -> Self {
        Self {
            event_name: event_name.to_string(),
            artists,
        }
    }

    // 去掉空白艺人名，空活动名回退到默认值
    fn normalized(self) -> Result<(String, Vec<String>), AppError> {
        let artists: Vec<String> = self
            .artists
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(|a| a.to_string())
            .collect();
        if artists.is_empty() {
            return Err(AppError::InvalidInput(
                "at least one artist is required".to_string(),
            ));
        }
        let event_name = match self.event_name.trim() {
            "" => DEFAULT_EVENT_NAME.to_string(),
            name => name.to_string(),
        };
        Ok((event_name, artists))
    }
}

/// 播放列表组装服务
///
/// 按输入顺序逐个搜索艺人，收集热门曲目，新建播放列表后分批写入。
/// 所有曲库调用都是串行的。
#[derive(Clone)]
pub struct PlaylistAssemblyService {
    catalog: Arc<dyn CatalogClient>,
}

impl PlaylistAssemblyService {
    pub fn new(catalog: Arc<dyn CatalogClient>) -> Self {
        Self { catalog }
    }

    pub async fn create_playlist(
        &self,
        session: &AuthSession,
        cmd: CreatePlaylistCmd,
    ) -> Result<PlaylistResult, AppError> {
        let (event_name, artists) = cmd.normalized()?;

        let matches = self.match_artists(session, &artists).await?;
        let (artists_found, tracks) = self.collect_tracks(session, &matches).await?;
        if tracks.is_empty() {
            info!("none of {} artists matched the catalog", artists.len());
            return Err(AppError::NoCatalogMatches);
        }

        let owner = self.catalog.current_user(session).await?;
        let new_playlist = NewPlaylist::for_event(&event_name, Local::now().date_naive());
        let created = self
            .catalog
            .create_playlist(session, &owner.id, &new_playlist)
            .await
            .map_err(|e| write_error(e, None, 0))?;
        info!("created playlist '{}' ({})", new_playlist.name, created.id);

        // 分批写入，中途失败不回滚已写入的部分
        let mut tracks_added = 0;
        for batch in track_batches(&tracks) {
            if let Err(e) = self
                .catalog
                .add_tracks(session, &created.id, batch)
                .await
            {
                warn!(
                    "adding tracks to {} failed after {} of {} tracks: {}",
                    created.id,
                    tracks_added,
                    tracks.len(),
                    e
                );
                return Err(write_error(e, Some(created.url.clone()), tracks_added));
            }
            tracks_added += batch.len();
        }

        Ok(PlaylistResult {
            playlist_url: created.url,
            playlist_name: new_playlist.name,
            artists_found,
            tracks_added,
        })
    }

    /// 逐个搜索艺人；单个艺人搜索失败只记录日志并视为未匹配
    pub async fn match_artists(
        &self,
        session: &AuthSession,
        artists: &[String],
    ) -> Result<Vec<ArtistMatch>, AppError> {
        let mut matches = Vec::with_capacity(artists.len());
        for name in artists {
            let artist_match = match self.catalog.search_artist(session, name).await {
                Ok(Some(id)) => {
                    debug!("artist '{}' matched {}", name, id);
                    ArtistMatch::matched(name, id)
                }
                Ok(None) => {
                    info!("artist '{}' not found on catalog", name);
                    ArtistMatch::unmatched(name)
                }
                Err(CatalogError::Unauthorized(msg)) => {
                    return Err(CatalogError::Unauthorized(msg).into());
                }
                Err(e) => {
                    warn!("searching artist '{}' failed: {}", name, e);
                    ArtistMatch::unmatched(name)
                }
            };
            matches.push(artist_match);
        }
        Ok(matches)
    }

    // 返回 (匹配到的艺人名, 曲目 URI)，都保持输入顺序
    async fn collect_tracks(
        &self,
        session: &AuthSession,
        matches: &[ArtistMatch],
    ) -> Result<(Vec<String>, Vec<TrackUri>), AppError> {
        let mut artists_found = Vec::new();
        let mut tracks = Vec::new();
        for artist in matches {
            let Some(id) = &artist.catalog_id else {
                continue;
            };
            artists_found.push(artist.requested_name.clone());
            match self.catalog.top_tracks(session, id).await {
                Ok(top) => tracks.extend(top.into_iter().take(TOP_TRACKS_PER_ARTIST)),
                Err(CatalogError::Unauthorized(msg)) => {
                    return Err(CatalogError::Unauthorized(msg).into());
                }
                Err(e) => warn!(
                    "fetching top tracks for '{}' failed: {}",
                    artist.requested_name, e
                ),
            }
        }
        Ok((artists_found, tracks))
    }
}

fn write_error(err: CatalogError, playlist_url: Option<String>, tracks_added: usize) -> AppError {
    match err {
        CatalogError::Unauthorized(_) => AppError::Unauthenticated,
        other => AppError::PlaylistWrite {
            message: other.to_string(),
            playlist_url,
            tracks_added,
        },
    }
}
