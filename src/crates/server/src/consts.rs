pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 所有 JSON 接口的路径前缀
pub const URL_PATH_API: &str = "/api";

pub const DEFAULT_SESSION_COOKIE: &str = "sid";
/// 默认 cookie 有效期（秒）
pub const COOKIE_EXPIRY: i64 = 7 * 24 * 3600;

/// multipart 中承载图片的字段名
pub const UPLOAD_FIELD_NAME: &str = "file";

pub const AUTH_SUCCESS_QUERY: &str = "auth=success";
pub const AUTH_FAILED_QUERY: &str = "error=auth_failed";
