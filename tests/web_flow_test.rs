use axum::{
    body::{self, Body},
    http::{header, Request, StatusCode},
    Router,
};
use holiday_map::app::{build_controller, build_session_store};
use holiday_map::web::{build_router, AppState, SESSION_COOKIE};
use holiday_map::{AppConfig, CalendarificClient, NominatimClient};
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const YEAR: i32 = 2025;

type LiveState = Arc<AppState<NominatimClient, CalendarificClient>>;

fn test_app(server: &MockServer) -> Router {
    build_router(test_state(server))
}

fn test_state(server: &MockServer) -> LiveState {
    let mut config = AppConfig::default();
    config.geocoding.endpoint = server.url("/reverse");
    config.holidays.endpoint = server.url("/api/v2/holidays");
    config.holidays.api_key = Some("test-key".to_string());

    let controller = build_controller(&config).unwrap();
    let sessions = build_session_store(&config).unwrap();
    let mut state = AppState::new(controller, sessions);
    state.fixed_year = Some(YEAR);

    Arc::new(state)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn click_request(lat: f64, lng: f64, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/api/click").header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder
        .body(Body::from(
            serde_json::json!({ "lat": lat, "lng": lng }).to_string(),
        ))
        .unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    let pair = set_cookie.split(';').next().unwrap().to_string();
    assert!(pair.starts_with(SESSION_COOKIE));
    pair
}

#[tokio::test]
async fn test_index_page_issues_session_cookie() {
    let server = MockServer::start_async().await;
    let app = test_app(&server);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("World Holiday Calendar"));
    assert!(html.contains("id=\"map\""));
}

#[tokio::test]
async fn test_fresh_session_prompts_for_click() {
    let server = MockServer::start_async().await;
    let app = test_app(&server);

    let response = app
        .oneshot(Request::get("/api/view").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let view = json_body(response).await;
    assert_eq!(view["results"]["kind"], "prompt");
    assert_eq!(view["map"]["zoom"], 4);
    assert!(view["map"]["marker"].is_null());
}

#[tokio::test]
async fn test_click_on_seoul_renders_holiday_table() {
    let server = MockServer::start_async().await;
    let geo_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/reverse").query_param("lat", "37.5665");
            then.status(200).json_body(serde_json::json!({
                "address": {"country": "South Korea", "country_code": "kr"}
            }));
        })
        .await;
    let holiday_mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v2/holidays")
                .query_param("country", "KR")
                .query_param("year", "2025");
            then.status(200).json_body(serde_json::json!({
                "meta": {"code": 200},
                "response": {"holidays": [
                    {"name": "New Year's Day", "description": "First day of the year", "date": {"iso": "2025-01-01"}},
                    {"name": "Children's Day", "description": "Day for children", "date": {"iso": "2025-05-05"}}
                ]}
            }));
        })
        .await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(click_request(37.5665, 126.9780, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let view = json_body(response).await;

    geo_mock.assert_async().await;
    holiday_mock.assert_async().await;
    assert_eq!(view["results"]["kind"], "holidays_loaded");
    assert_eq!(
        view["results"]["header"],
        "Public holidays in South Korea (KR) for 2025"
    );
    assert_eq!(
        view["results"]["columns"],
        serde_json::json!(["Date", "Holiday", "Description"])
    );
    assert_eq!(view["results"]["rows"][1]["iso_date"], "2025-05-05");
    assert_eq!(view["map"]["zoom"], 6);
    assert_eq!(view["map"]["marker"]["latitude"], 37.5665);

    // a later render of the same session fetches the holidays again
    let response = app
        .oneshot(
            Request::get("/api/view")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let view = json_body(response).await;
    assert_eq!(view["results"]["kind"], "holidays_loaded");
    holiday_mock.assert_hits_async(2).await;
    geo_mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn test_click_on_ocean_warns_without_holiday_fetch() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/reverse");
            then.status(200)
                .json_body(serde_json::json!({"error": "Unable to geocode"}));
        })
        .await;
    let holiday_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/holidays");
            then.status(200)
                .json_body(serde_json::json!({"response": {"holidays": []}}));
        })
        .await;
    let app = test_app(&server);

    let response = app.oneshot(click_request(0.0, -30.0, None)).await.unwrap();
    let view = json_body(response).await;

    assert_eq!(view["results"]["kind"], "prompt");
    assert_eq!(view["notices"][0]["level"], "warning");
    assert_eq!(view["map"]["marker"]["longitude"], -30.0);
    holiday_mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn test_bad_api_key_shows_inline_error_and_stays_interactive() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/reverse");
            then.status(200).json_body(serde_json::json!({
                "address": {"country": "Japan", "country_code": "jp"}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/holidays");
            then.status(401).json_body(serde_json::json!({
                "meta": {"code": 401, "error_detail": "Missing or invalid api credentials."},
                "response": []
            }));
        })
        .await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(click_request(35.6762, 139.6503, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let view = json_body(response).await;

    assert_eq!(view["results"]["kind"], "fetch_failed");
    assert!(view["results"]["rows"].is_null());
    assert_eq!(view["notices"][0]["level"], "error");
    assert!(view["notices"][0]["message"]
        .as_str()
        .unwrap()
        .contains("Missing or invalid api credentials."));

    // the session still takes clicks
    let response = app
        .oneshot(click_request(34.6937, 135.5023, Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_invalid_latitude_is_rejected() {
    let server = MockServer::start_async().await;
    let app = test_app(&server);

    let response = app.oneshot(click_request(95.0, 10.0, None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_ending_session_resets_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/reverse");
            then.status(200)
                .json_body(serde_json::json!({"error": "Unable to geocode"}));
        })
        .await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(click_request(0.0, -30.0, None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(
            Request::delete("/api/session")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get("/api/view")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let view = json_body(response).await;
    assert!(view["map"]["marker"].is_null());
    assert_eq!(view["map"]["zoom"], 4);
}

#[tokio::test]
async fn test_newer_click_wins_over_slower_earlier_click() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/reverse").query_param("lat", "37.5");
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(serde_json::json!({
                    "address": {"country": "South Korea", "country_code": "kr"}
                }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/reverse").query_param("lat", "10.5");
            then.status(200).json_body(serde_json::json!({
                "address": {"country": "France", "country_code": "fr"}
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v2/holidays");
            then.status(200)
                .json_body(serde_json::json!({"response": {"holidays": []}}));
        })
        .await;
    let app = test_app(&server);

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let slow = app
        .clone()
        .oneshot(click_request(37.5, 126.9, Some(&cookie)));
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.clone()
            .oneshot(click_request(10.5, 2.0, Some(&cookie)))
            .await
    };
    let (slow, fast) = tokio::join!(slow, fast);
    assert_eq!(slow.unwrap().status(), StatusCode::OK);
    assert_eq!(fast.unwrap().status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::get("/api/view")
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let view = json_body(response).await;

    assert_eq!(view["map"]["marker"]["latitude"], 10.5);
    assert_eq!(view["results"]["country"]["code"], "FR");
}

#[tokio::test]
async fn test_cookieless_views_do_not_create_sessions() {
    let server = MockServer::start_async().await;
    let state = test_state(&server);
    let app = build_router(state.clone());

    for _ in 0..20 {
        let response = app
            .clone()
            .oneshot(Request::get("/api/view").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_malformed_click_body_gets_json_error() {
    let server = MockServer::start_async().await;
    let app = test_app(&server);

    for body in [r#"{"lat": "north", "lng": 2.0}"#, "not json", r#"{"lat": 10.0}"#] {
        let response = app
            .clone()
            .oneshot(
                Request::post("/api/click")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        let error = json_body(response).await;
        assert!(error["error"]
            .as_str()
            .unwrap()
            .starts_with("Malformed click request"));
        assert!(error["suggestion"].as_str().unwrap().contains("lat"));
    }
}
