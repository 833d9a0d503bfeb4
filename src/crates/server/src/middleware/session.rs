use crate::{consts, AppState};
use actix_cors::Cors;
use actix_web::{
    body::MessageBody,
    cookie::{Cookie, SameSite},
    dev::{Payload, ServiceRequest, ServiceResponse},
    http::{header, Method},
    middleware::Next,
    web, FromRequest, HttpMessage, HttpRequest,
};
use domain::value::SessionId;
use futures::future::{ready, Ready};
use log::debug;
use uuid::Uuid;

/// 当前请求所属的 Web 会话
#[derive(Debug, Clone)]
pub struct RequestSession(pub SessionId);

impl FromRequest for RequestSession {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<RequestSession>()
                .cloned()
                .ok_or_else(|| actix_web::error::ErrorInternalServerError("Missing session id")),
        )
    }
}

struct CookieSettings {
    name: String,
    secure: bool,
    max_age_secs: i64,
}

fn cookie_settings(req: &ServiceRequest) -> CookieSettings {
    req.app_data::<web::Data<AppState>>()
        .map(|state| {
            let cfg = state.app_cfg.session();
            CookieSettings {
                name: cfg.cookie_name,
                secure: cfg.cookie_secure,
                max_age_secs: cfg.max_age_secs,
            }
        })
        .unwrap_or_else(|| CookieSettings {
            name: consts::DEFAULT_SESSION_COOKIE.to_string(),
            secure: true,
            max_age_secs: consts::COOKIE_EXPIRY,
        })
}

/// session_id middleware reads the session cookie, or mints a new UUID v4 session id
/// and sets it as a cookie on the response. The id is put into the request extensions.
pub async fn session_id(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let settings = cookie_settings(&req);

    // 只接受合法的 UUID，其余一律视为新会话
    let existing = req
        .cookie(&settings.name)
        .map(|c| c.value().to_string())
        .filter(|v| Uuid::parse_str(v).is_ok());

    let (id, cookie_to_set) = match existing {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!("new web session {}", id);
            let mut cookie = Cookie::new(settings.name.clone(), id.clone());
            cookie.set_http_only(true);
            cookie.set_secure(settings.secure);
            cookie.set_same_site(SameSite::None);
            cookie.set_path("/");
            cookie.set_max_age(actix_web::cookie::time::Duration::seconds(
                settings.max_age_secs,
            ));
            (id, Some(cookie))
        }
    };

    req.extensions_mut()
        .insert(RequestSession(SessionId::from(id)));

    let mut rsp = next.call(req).await?;

    if let Some(cookie) = cookie_to_set {
        rsp.response_mut().add_cookie(&cookie)?;
    }

    Ok(rsp)
}

/// 只允许前端来源跨域，并允许携带 cookie
pub fn cors(frontend_url: &str) -> Cors {
    Cors::default()
        .allowed_origin(frontend_url)
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600)
}
