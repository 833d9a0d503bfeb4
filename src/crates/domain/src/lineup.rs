/// 未识别到活动名称时使用的默认名称
pub const DEFAULT_EVENT_NAME: &str = "Music Festival";
/// 单张海报最多保留的艺人数
pub const MAX_ARTISTS: usize = 20;

const EVENT_PREFIX: &str = "EVENT:";
const ARTISTS_MARKER: &str = "ARTISTS:";

/// 海报识别结果
///
/// 由视觉模型的文本回答解析而来，创建后不可修改。
/// `artists` 保持海报上的出现顺序，最多 [`MAX_ARTISTS`] 个。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    event_name: String,
    artists: Vec<String>,
}

impl ExtractionResult {
    pub fn new(event_name: &str, artists: Vec<String>) -> Self {
        let event_name = event_name.trim();
        let mut artists = artists;
        artists.truncate(MAX_ARTISTS);
        Self {
            event_name: if event_name.is_empty() {
                DEFAULT_EVENT_NAME.to_string()
            } else {
                event_name.to_string()
            },
            artists,
        }
    }

    /// 识别失败时返回的空结果
    pub fn empty() -> Self {
        Self::new(DEFAULT_EVENT_NAME, Vec::new())
    }

    /// Parse the model's free-form answer.
    ///
    /// An `EVENT:` line sets the event name, a bare `ARTISTS:` line switches into artist mode
    /// and every non-empty line after it is taken verbatim (trimmed). Text without the markup
    /// yields no artists.
    pub fn parse(text: &str) -> Self {
        let mut event_name: Option<String> = None;
        let mut artists = Vec::new();
        let mut collecting = false;

        for line in text.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix(EVENT_PREFIX) {
                let name = rest.trim();
                if !name.is_empty() {
                    event_name = Some(name.to_string());
                }
                continue;
            }
            if line == ARTISTS_MARKER {
                collecting = true;
                continue;
            }
            if collecting && !line.is_empty() {
                artists.push(line.to_string());
            }
        }

        Self::new(
            event_name.as_deref().unwrap_or(DEFAULT_EVENT_NAME),
            artists,
        )
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn has_artists(&self) -> bool {
        !self.artists.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.event_name, self.artists)
    }
}
