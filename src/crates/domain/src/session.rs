use chrono::{DateTime, Duration, Utc};

/// 曲库 OAuth 会话
///
/// 每个 Web 会话独占一份，OAuth 回调时创建，刷新令牌时替换，
/// 登出或令牌失效时销毁。
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    pub expiry: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(access_token: &str, refresh_token: &str, expiry: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token.to_string(),
            expiry,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry <= now
    }

    /// 在 `margin` 内即将过期时也需要刷新
    pub fn needs_refresh(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        self.expiry - margin <= now
    }

    /// 刷新后的会话；曲库未返回新的 refresh token 时沿用旧值
    pub fn refreshed(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        expiry: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: access_token.to_string(),
            refresh_token: refresh_token
                .filter(|t| !t.is_empty())
                .unwrap_or(&self.refresh_token)
                .to_string(),
            expiry,
        }
    }
}
