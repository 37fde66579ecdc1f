use axum::{
    http::{header, HeaderName, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::handlers::{
    check_printer_details, check_printers, healthz, method_not_allowed, preflight, readyz,
};
use crate::state::AppState;

// Same endpoints under the bare path, the api prefix and the legacy functions path.
const ROUTE_PREFIXES: [&str; 3] = ["", "/api", "/.netlify/functions"];

pub fn build_router(state: AppState) -> Router {
    let status = post(check_printers)
        .options(preflight)
        .fallback(method_not_allowed);
    let details = post(check_printer_details)
        .options(preflight)
        .fallback(method_not_allowed);

    let mut router: Router<AppState> = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz));
    for prefix in ROUTE_PREFIXES {
        router = router
            .route(&format!("{prefix}/check-printers"), status.clone())
            .route(&format!("{prefix}/check-printer-details"), details.clone());
    }

    router
        .layer(cors_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .layer(cors_header(header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"))
        .layer(cors_header(header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_header(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::SimulationConfig;
    use crate::probe::StubResolver;

    fn router(details_online_ratio: f64) -> Router {
        let sim = SimulationConfig {
            seed: Some(7),
            details_online_ratio,
            delay_min: Duration::ZERO,
            delay_max: Duration::ZERO,
            ..SimulationConfig::default()
        };
        build_router(AppState::new(Arc::new(StubResolver { fail: false }), sim))
    }

    async fn call(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let body = match body {
            Some(text) => Body::from(text.to_string()),
            None => Body::empty(),
        };
        let resp = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        (status, headers, bytes.to_vec())
    }

    fn json_of(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    const WIHD: &str = r#"{"printers":[{"name":"WIHD","ip":"136.167.66.220"}]}"#;

    #[tokio::test]
    async fn status_example_request() {
        let app = router(0.9);
        let (status, headers, body) = call(&app, "POST", "/check-printers", Some(WIHD)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["access-control-allow-origin"], "*");

        let results = json_of(&body);
        let results = results.as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["name"], "WIHD");
        assert!(matches!(
            results[0]["status"].as_str(),
            Some("online") | Some("offline")
        ));
        let timestamp = results[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn every_prefix_is_routed() {
        let app = router(0.9);
        for prefix in ROUTE_PREFIXES {
            for endpoint in ["check-printers", "check-printer-details"] {
                let uri = format!("{prefix}/{endpoint}");
                let (status, _, _) = call(&app, "POST", &uri, Some(WIHD)).await;
                assert_eq!(status, StatusCode::OK, "{uri}");
            }
        }
    }

    #[tokio::test]
    async fn options_is_empty_ok() {
        let app = router(0.9);
        for uri in ["/check-printers", "/api/check-printer-details"] {
            let (status, headers, body) = call(&app, "OPTIONS", uri, Some("garbage")).await;
            assert_eq!(status, StatusCode::OK);
            assert!(body.is_empty());
            assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
            assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        }
    }

    #[tokio::test]
    async fn get_is_method_not_allowed() {
        let app = router(0.9);
        for uri in ["/check-printers", "/check-printer-details"] {
            let (status, headers, body) = call(&app, "GET", uri, None).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(json_of(&body), json!({"error": "Method not allowed"}));
            assert_eq!(headers["access-control-allow-origin"], "*");
        }
        let (status, _, _) = call(&app, "PUT", "/check-printers", Some(WIHD)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn malformed_bodies() {
        let app = router(0.9);
        let (status, _, body) = call(&app, "POST", "/check-printers", Some("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["error"], "Invalid request format");

        let (status, _, _) = call(
            &app,
            "POST",
            "/check-printer-details",
            Some(r#"{"printers":{"name":"WIHD"}}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, _) = call(
            &app,
            "POST",
            "/check-printers",
            Some(r#"{"printers":[{"name":"WIHD"}]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _, body) = call(&app, "POST", "/check-printers", Some("not json")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_of(&body);
        assert_eq!(body["error"], "Internal server error");
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn offline_details_example() {
        let app = router(0.0);
        let (status, _, body) = call(&app, "POST", "/check-printer-details", Some(WIHD)).await;
        assert_eq!(status, StatusCode::OK);
        let details = json_of(&body);
        let detail = &details[0];
        assert_eq!(detail["status"], "offline");
        assert!(detail["error"].is_string());
        let toners = detail["toners"].as_array().unwrap();
        assert_eq!(toners, &vec![json!({"color": "Black", "level": 0})]);
        assert!(detail.get("model").is_none());
    }

    #[tokio::test]
    async fn online_details_shape() {
        let app = router(1.0);
        let request = json!({"printers": [
            {"name": "oneill3rdfloorcolorprinter01.bc.edu", "ip": "136.167.67.81"},
            {"name": "2150comm.bc.edu", "ip": "136.167.214.175"},
        ]});
        let (status, _, body) = call(
            &app,
            "POST",
            "/api/check-printer-details",
            Some(&request.to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let details = json_of(&body);
        let details = details.as_array().unwrap();
        assert_eq!(details[0]["name"], "oneill3rdfloorcolorprinter01.bc.edu");
        assert_eq!(details[0]["toners"].as_array().unwrap().len(), 4);
        assert_eq!(details[1]["model"], "Xerox VersaLink C405");
        for detail in details {
            for toner in detail["toners"].as_array().unwrap() {
                let level = toner["level"].as_u64().unwrap();
                assert!(level <= 100);
            }
            assert!(detail["pageCount"].as_u64().is_some());
            assert!(detail["maintenance"]["drumLife"].as_u64().is_some());
            assert_eq!(detail["trays"].as_array().unwrap().len(), 3);
        }
    }

    #[tokio::test]
    async fn health_endpoints() {
        let app = router(0.9);
        let (status, _, _) = call(&app, "GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = call(&app, "GET", "/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
