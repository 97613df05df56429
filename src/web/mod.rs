use crate::app::current_year;
use crate::core::controller::InteractionController;
use crate::core::session::SessionStore;
use crate::domain::model::Coordinate;
use crate::domain::ports::{Geocoder, HolidayProvider};
use crate::utils::error::AppError;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "holiday_map_session";

const INDEX_HTML: &str = include_str!("index.html");

pub struct AppState<G: Geocoder, H: HolidayProvider> {
    pub controller: InteractionController<G, H>,
    pub sessions: SessionStore,
    /// Pins the holiday year; `None` means the current calendar year.
    pub fixed_year: Option<i32>,
}

impl<G: Geocoder, H: HolidayProvider> AppState<G, H> {
    pub fn new(controller: InteractionController<G, H>, sessions: SessionStore) -> Self {
        Self {
            controller,
            sessions,
            fixed_year: None,
        }
    }

    fn year(&self) -> i32 {
        self.fixed_year.unwrap_or_else(current_year)
    }
}

#[derive(Debug, Deserialize)]
struct ClickRequest {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    suggestion: &'static str,
}

pub fn build_router<G, H>(state: Arc<AppState<G, H>>) -> Router
where
    G: Geocoder + 'static,
    H: HolidayProvider + 'static,
{
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/api/view", get(current_view::<G, H>))
        .route("/api/click", post(click::<G, H>))
        .route("/api/session", delete(end_session::<G, H>))
        .with_state(state)
}

pub async fn serve<G, H>(state: Arc<AppState<G, H>>, bind: &str) -> anyhow::Result<()>
where
    G: Geocoder + 'static,
    H: HolidayProvider + 'static,
{
    let addr: SocketAddr = bind
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid bind address '{}': {}", bind, e))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn index(headers: HeaderMap) -> Response {
    let (_, set_cookie) = session_id(&headers);
    with_cookie(Html(INDEX_HTML).into_response(), set_cookie)
}

async fn current_view<G: Geocoder, H: HolidayProvider>(
    State(state): State<Arc<AppState<G, H>>>,
    headers: HeaderMap,
) -> Response {
    let (id, set_cookie) = session_id(&headers);
    let session = state.sessions.current(id).await;

    let view = state.controller.render(&session, state.year()).await;
    with_cookie(Json(view).into_response(), set_cookie)
}

async fn click<G: Geocoder, H: HolidayProvider>(
    State(state): State<Arc<AppState<G, H>>>,
    headers: HeaderMap,
    payload: Result<Json<ClickRequest>, JsonRejection>,
) -> Response {
    let (id, set_cookie) = session_id(&headers);

    let coordinate = match payload
        .map_err(|rejection| AppError::InvalidRequest {
            message: rejection.body_text(),
        })
        .and_then(|Json(req)| Coordinate::new(req.lat, req.lng))
    {
        Ok(c) => c,
        Err(e) => return with_cookie(error_response(StatusCode::BAD_REQUEST, &e), set_cookie),
    };

    // the lock is only held at the start and the commit, never across the lookups
    let (session, ticket) = state.sessions.begin_click(id).await;
    let (session, view) = state
        .controller
        .interact(session, Some(coordinate), state.year())
        .await;
    if !state.sessions.commit(ticket, session).await {
        tracing::debug!("Click at {:?} was superseded by a newer click", coordinate);
    }

    with_cookie(Json(view).into_response(), set_cookie)
}

async fn end_session<G: Geocoder, H: HolidayProvider>(
    State(state): State<Arc<AppState<G, H>>>,
    headers: HeaderMap,
) -> Response {
    if let Some(id) = cookie_session_id(&headers) {
        state.sessions.end(id).await;
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_static("holiday_map_session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"),
    );
    response
}

fn error_response(status: StatusCode, err: &AppError) -> Response {
    (
        status,
        Json(ErrorBody {
            error: err.user_friendly_message(),
            suggestion: err.recovery_suggestion(),
        }),
    )
        .into_response()
}

/// The session id from the cookie, or a fresh one plus the cookie to set.
fn session_id(headers: &HeaderMap) -> (Uuid, Option<HeaderValue>) {
    match cookie_session_id(headers) {
        Some(id) => (id, None),
        None => {
            let id = Uuid::new_v4();
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id);
            // a hyphenated uuid is always a valid header value
            (id, HeaderValue::from_str(&cookie).ok())
        }
    }
}

fn cookie_session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn with_cookie(mut response: Response, set_cookie: Option<HeaderValue>) -> Response {
    if let Some(cookie) = set_cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}
