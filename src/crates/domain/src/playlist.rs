use crate::value::{CatalogArtistId, CatalogPlaylistId, TrackUri};
use chrono::NaiveDate;

/// 每个匹配艺人最多取的热门曲目数
pub const TOP_TRACKS_PER_ARTIST: usize = 3;
/// 曲库单次添加曲目的上限
pub const ADD_ITEMS_BATCH_LIMIT: usize = 100;
/// 新建播放列表的固定描述
pub const PLAYLIST_DESCRIPTION: &str = "Created from concert lineup image";

/// 艺人名到曲库 ID 的匹配结果，`catalog_id` 为空表示未匹配
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistMatch {
    pub requested_name: String,
    pub catalog_id: Option<CatalogArtistId>,
}

impl ArtistMatch {
    pub fn matched(requested_name: &str, catalog_id: CatalogArtistId) -> Self {
        Self {
            requested_name: requested_name.to_string(),
            catalog_id: Some(catalog_id),
        }
    }

    pub fn unmatched(requested_name: &str) -> Self {
        Self {
            requested_name: requested_name.to_string(),
            catalog_id: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.catalog_id.is_some()
    }
}

/// 创建播放列表的请求
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlaylist {
    pub name: String,
    pub description: String,
    pub public: bool,
}

impl NewPlaylist {
    /// 以活动名称和日期生成公开播放列表
    pub fn for_event(event_name: &str, date: NaiveDate) -> Self {
        Self {
            name: playlist_name(event_name, date),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: true,
        }
    }
}

/// 曲库中已创建的播放列表
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlaylist {
    pub id: CatalogPlaylistId,
    pub url: String,
}

/// 返回给调用方的播放列表结果，不落库
#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistResult {
    pub playlist_url: String,
    pub playlist_name: String,
    pub artists_found: Vec<String>,
    pub tracks_added: usize,
}

/// "<event_name> - MM/DD/YYYY"
pub fn playlist_name(event_name: &str, date: NaiveDate) -> String {
    format!("{} - {}", event_name, date.format("%m/%d/%Y"))
}

/// 按曲库批量上限切分曲目，保持原有顺序
pub fn track_batches(tracks: &[TrackUri]) -> impl Iterator<Item = &[TrackUri]> {
    tracks.chunks(ADD_ITEMS_BATCH_LIMIT)
}
