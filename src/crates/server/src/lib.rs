pub mod auth;
pub mod consts;
pub mod error;
pub mod lineup;
pub mod middleware;

#[cfg(test)]
mod test_support;

use actix_web::{middleware::from_fn, web};
use application::auth::{SessionAuthService, SessionStore};
use application::catalog::{CatalogAuthorizer, CatalogClient};
use application::command::extraction::ExtractionService;
use application::command::playlist::PlaylistAssemblyService;
use application::vision::VisionClient;
use infra::config::AppConfigImpl;
use infra::{InMemorySessionStore, OpenAiVision, SpotifyCatalog, UploadStorage};
use log::info;
use std::sync::Arc;

use crate::middleware::session;

pub struct AppState {
    pub app_cfg: AppConfigImpl,
    pub auth: SessionAuthService,
    pub extraction: ExtractionService,
    pub playlists: PlaylistAssemblyService,
    pub uploads: UploadStorage,
}

impl AppState {
    pub fn new(app_cfg: AppConfigImpl) -> Self {
        let spotify = Arc::new(SpotifyCatalog::new(app_cfg.spotify()));
        let vision = Arc::new(OpenAiVision::new(app_cfg.openai()));
        let store = Arc::new(InMemorySessionStore::new(&app_cfg.session()));
        info!(
            "catalog redirect uri {}, vision model {}",
            app_cfg.spotify().redirect_uri,
            app_cfg.openai().model
        );
        Self::with_adapters(app_cfg, store, spotify.clone(), spotify, vision)
    }

    /// 用给定的适配器组装服务
    pub fn with_adapters(
        app_cfg: AppConfigImpl,
        store: Arc<dyn SessionStore>,
        authorizer: Arc<dyn CatalogAuthorizer>,
        catalog: Arc<dyn CatalogClient>,
        vision: Arc<dyn VisionClient>,
    ) -> Self {
        let uploads = UploadStorage::new(&app_cfg.upload());
        Self {
            auth: SessionAuthService::new(store, authorizer, catalog.clone()),
            extraction: ExtractionService::new(vision),
            playlists: PlaylistAssemblyService::new(catalog),
            uploads,
            app_cfg,
        }
    }
}

/// 注册 `/api` 下的全部路由
pub fn configure_service(svc: &mut web::ServiceConfig) {
    svc.service(
        web::scope(consts::URL_PATH_API)
            .wrap(from_fn(session::session_id))
            .service(auth::configure_service())
            .route("/callback", web::get().to(auth::callback))
            .configure(lineup::configure_service),
    );
}
