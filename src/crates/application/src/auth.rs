use std::sync::Arc;

use crate::catalog::{CatalogAuthorizer, CatalogClient};
use crate::error::AppError;
use chrono::{Duration, Utc};
use domain::session::AuthSession;
use domain::user::CatalogUser;
use domain::value::SessionId;
use log::{info, warn};

/// 令牌在该时间内过期时提前刷新
const REFRESH_MARGIN_SECS: i64 = 60;

/// 按 Web 会话保存曲库令牌，不同会话之间互不可见
pub trait SessionStore: Send + Sync {
    fn load(&self, id: &SessionId) -> Option<AuthSession>;
    fn save(&self, id: &SessionId, session: AuthSession);
    fn remove(&self, id: &SessionId);
}

/// 会话鉴权服务
///
/// 状态机：未登录 --(OAuth 回调)--> 已登录 --(令牌失效 / 登出)--> 未登录
#[derive(Clone)]
pub struct SessionAuthService {
    store: Arc<dyn SessionStore>,
    authorizer: Arc<dyn CatalogAuthorizer>,
    catalog: Arc<dyn CatalogClient>,
}

impl SessionAuthService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        authorizer: Arc<dyn CatalogAuthorizer>,
        catalog: Arc<dyn CatalogClient>,
    ) -> Self {
        Self {
            store,
            authorizer,
            catalog,
        }
    }

    /// URL the browser is sent to for the catalog consent screen
    pub fn login_url(&self) -> Result<String, AppError> {
        Ok(self.authorizer.authorize_url()?)
    }

    /// Exchange the OAuth callback code and bind the tokens to this web session
    pub async fn complete_login(&self, session_id: &SessionId, code: &str) -> Result<(), AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::InvalidInput("missing authorization code".to_string()));
        }
        let session = self.authorizer.exchange_code(code).await?;
        self.store.save(session_id, session);
        info!("session {} authenticated", session_id);
        Ok(())
    }

    /// Returns a usable token record, refreshing it first when it is about to expire.
    /// No record, or a failed refresh, is `Unauthenticated`.
    pub async fn active_session(&self, session_id: &SessionId) -> Result<AuthSession, AppError> {
        let session = self
            .store
            .load(session_id)
            .ok_or(AppError::Unauthenticated)?;

        if !session.needs_refresh(Utc::now(), Duration::seconds(REFRESH_MARGIN_SECS)) {
            return Ok(session);
        }

        match self.authorizer.refresh(&session).await {
            Ok(refreshed) => {
                info!("session {} token refreshed", session_id);
                self.store.save(session_id, refreshed.clone());
                Ok(refreshed)
            }
            Err(e) => {
                warn!("session {} token refresh failed: {}", session_id, e);
                self.invalidate(session_id);
                Err(AppError::Unauthenticated)
            }
        }
    }

    /// 当前登录用户；任何失败都会清空会话并视为未登录
    pub async fn status(&self, session_id: &SessionId) -> Option<CatalogUser> {
        let session = self.active_session(session_id).await.ok()?;
        match self.catalog.current_user(&session).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("session {} status check failed: {}", session_id, e);
                self.invalidate(session_id);
                None
            }
        }
    }

    pub fn logout(&self, session_id: &SessionId) {
        self.store.remove(session_id);
        info!("session {} logged out", session_id);
    }

    pub fn invalidate(&self, session_id: &SessionId) {
        self.store.remove(session_id);
        warn!("session {} invalidated", session_id);
    }

    /// 曲库拒绝令牌时清空会话，其余结果原样返回
    pub fn guard<T>(&self, session_id: &SessionId, result: Result<T, AppError>) -> Result<T, AppError> {
        if let Err(e) = &result {
            if e.is_auth_error() {
                self.invalidate(session_id);
            }
        }
        result
    }
}
