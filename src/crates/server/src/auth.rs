use actix_web::{http::header, web, HttpResponse, Scope};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::consts;
use crate::error::ApiError;
use crate::middleware::session::RequestSession;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub auth_url: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

pub async fn login(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let auth_url = state.auth.login_url()?;
    Ok(HttpResponse::Ok().json(LoginResponse { auth_url }))
}

fn redirect_to_frontend(state: &AppState, query: &str) -> HttpResponse {
    let location = format!("{}?{}", state.app_cfg.frontend_url(), query);
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// OAuth 回调：成功或失败都跳回前端，由查询参数区分
pub async fn callback(
    state: web::Data<AppState>,
    session: RequestSession,
    query: web::Query<CallbackQuery>,
) -> HttpResponse {
    let Some(code) = query.code.as_deref() else {
        warn!(
            "oauth callback without code: {}",
            query.error.as_deref().unwrap_or("unknown")
        );
        return redirect_to_frontend(&state, consts::AUTH_FAILED_QUERY);
    };

    match state.auth.complete_login(&session.0, code).await {
        Ok(()) => redirect_to_frontend(&state, consts::AUTH_SUCCESS_QUERY),
        Err(e) => {
            warn!("oauth code exchange failed: {}", e);
            redirect_to_frontend(&state, consts::AUTH_FAILED_QUERY)
        }
    }
}

pub async fn status(state: web::Data<AppState>, session: RequestSession) -> HttpResponse {
    let body = match state.auth.status(&session.0).await {
        Some(user) => StatusResponse {
            authenticated: true,
            user: Some(UserInfo {
                display_name: user.display_name,
                id: user.id.to_string(),
            }),
        },
        None => StatusResponse {
            authenticated: false,
            user: None,
        },
    };
    HttpResponse::Ok().json(body)
}

pub async fn logout(state: web::Data<AppState>, session: RequestSession) -> HttpResponse {
    state.auth.logout(&session.0);
    HttpResponse::Ok().json(SuccessResponse { success: true })
}

pub fn configure_service() -> Scope {
    web::scope("/auth")
        .route("/login", web::get().to(login))
        .route("/status", web::get().to(status))
        .route("/logout", web::post().to(logout))
}
