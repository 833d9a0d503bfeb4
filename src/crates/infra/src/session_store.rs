use std::time::Duration;

use application::auth::SessionStore;
use domain::session::AuthSession;
use domain::value::SessionId;
use moka::sync::Cache;

use crate::config::SessionConfig;

/// 进程内会话存储，重启后所有会话失效
///
/// 闲置超过会话 cookie 有效期的记录会被淘汰。
#[derive(Clone)]
pub struct InMemorySessionStore {
    store: Cache<SessionId, AuthSession>,
}

impl InMemorySessionStore {
    pub fn new(config: &SessionConfig) -> Self {
        let secs = u64::try_from(config.max_age_secs).unwrap_or(0);
        Self::with_idle_timeout(Duration::from_secs(secs))
    }

    pub fn with_idle_timeout(idle: Duration) -> Self {
        Self {
            store: Cache::builder().time_to_idle(idle).build(),
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, id: &SessionId) -> Option<AuthSession> {
        self.store.get(id)
    }

    fn save(&self, id: &SessionId, session: AuthSession) {
        self.store.insert(id.clone(), session);
    }

    fn remove(&self, id: &SessionId) {
        self.store.invalidate(id);
    }
}
