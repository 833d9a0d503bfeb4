use config::{Config, Environment, File};
use dotenvy::dotenv;
use serde::Deserialize;
use std::error::Error;
use std::path::PathBuf;

/// 默认上传大小上限 16 MiB
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawConfig {
    /// 前端地址，用于 CORS 和 OAuth 回调后的跳转
    frontend_url: String,
    server: RawServerConfig,
    spotify: RawSpotifyConfig,
    openai: RawOpenAiConfig,
    upload: RawUploadConfig,
    session: RawSessionConfig,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            server: RawServerConfig::default(),
            spotify: RawSpotifyConfig::default(),
            openai: RawOpenAiConfig::default(),
            upload: RawUploadConfig::default(),
            session: RawSessionConfig::default(),
        }
    }
}

/// 服务器配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawServerConfig {
    /// 监听地址
    host: String,
    /// 监听端口
    port: u16,
}

impl Default for RawServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

/// Spotify 配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSpotifyConfig {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    /// 空格分隔的授权范围
    scopes: String,
    /// 每次登录都显示授权页
    show_dialog: bool,
}

impl Default for RawSpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: "".to_string(),
            client_secret: "".to_string(),
            redirect_uri: "http://127.0.0.1:5000/api/callback".to_string(),
            scopes: "playlist-modify-public playlist-modify-private".to_string(),
            show_dialog: true,
        }
    }
}

/// OpenAI 配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawOpenAiConfig {
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: "".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 500,
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }
}

/// 上传配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawUploadConfig {
    /// 上传文件的临时目录
    dir: String,
    max_bytes: usize,
}

impl Default for RawUploadConfig {
    fn default() -> Self {
        Self {
            dir: "uploads".to_string(),
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// 会话 cookie 配置（原始配置）
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSessionConfig {
    cookie_name: String,
    cookie_secure: bool,
    max_age_secs: i64,
}

impl Default for RawSessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sid".to_string(),
            cookie_secure: true,
            max_age_secs: 7 * 24 * 3600, // 7 天
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// 监听地址
    pub host: String,
    /// 监听端口
    pub port: u16,
}

/// Spotify 应用凭据与授权参数
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub show_dialog: bool,
}

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
}

impl OpenAiConfig {
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// 上传配置
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: String,
    pub max_bytes: usize,
}

impl UploadConfig {
    pub fn dir_path(&self) -> PathBuf {
        PathBuf::from(&self.dir)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub cookie_secure: bool,
    pub max_age_secs: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfigImpl {
    frontend_url: String,
    server: ServerConfig,
    spotify: SpotifyConfig,
    openai: OpenAiConfig,
    upload: UploadConfig,
    session: SessionConfig,
}

impl AppConfigImpl {
    fn new(data: RawConfig) -> Self {
        let spotify_config = SpotifyConfig {
            client_id: data.spotify.client_id,
            client_secret: data.spotify.client_secret,
            redirect_uri: data.spotify.redirect_uri,
            scopes: data
                .spotify
                .scopes
                .split_whitespace()
                .map(|s| s.to_string())
                .collect(),
            show_dialog: data.spotify.show_dialog,
        };
        AppConfigImpl {
            frontend_url: data.frontend_url.trim_end_matches('/').to_string(),
            server: ServerConfig {
                host: data.server.host,
                port: data.server.port,
            },
            spotify: spotify_config,
            openai: OpenAiConfig {
                api_key: data.openai.api_key,
                model: data.openai.model,
                max_tokens: data.openai.max_tokens,
                base_url: data.openai.base_url,
            },
            upload: UploadConfig {
                dir: data.upload.dir,
                max_bytes: data.upload.max_bytes,
            },
            session: SessionConfig {
                cookie_name: data.session.cookie_name,
                cookie_secure: data.session.cookie_secure,
                max_age_secs: data.session.max_age_secs,
            },
        }
    }

    pub fn load() -> Result<AppConfigImpl, Box<dyn Error>> {
        dotenv().ok();

        let config = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<AppConfigImpl, Box<dyn Error>> {
        let raw: RawConfig = config.try_deserialize()?; // serde 自动填充默认值
        Ok(AppConfigImpl::new(raw))
    }

    pub fn frontend_url(&self) -> &str {
        &self.frontend_url
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone()
    }

    pub fn spotify(&self) -> SpotifyConfig {
        self.spotify.clone()
    }

    pub fn openai(&self) -> OpenAiConfig {
        self.openai.clone()
    }

    pub fn upload(&self) -> UploadConfig {
        self.upload.clone()
    }

    pub fn session(&self) -> SessionConfig {
        self.session.clone()
    }
}

impl Default for AppConfigImpl {
    fn default() -> Self {
        AppConfigImpl::new(RawConfig::default())
    }
}
