//! Route table.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! CORS is permissive — the original deployment serves cross-origin mobile
//! browser clients.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the service router: health, diagnosis, report.
pub fn app_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/", get(endpoints::health::check))
        .route("/predict", post(endpoints::predict::analyze))
        .route("/generate_pdf", post(endpoints::report::generate))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::AppConfig;
    use crate::provider::MockProvider;

    const BOUNDARY: &str = "leafscan-test-boundary";

    const FENCED_TOMATO_REPLY: &str = "```json\n{\"v\":\"Tomato\",\"d\":\"Early Blight\",\"t\":\"Apply copper fungicide weekly.\"}\n```";

    fn test_router(mock: Arc<MockProvider>) -> Router {
        let config = AppConfig::from_lookup(|_| None);
        app_router(ApiContext::new(mock, &config))
    }

    /// A tiny but genuinely decodable PNG.
    fn sample_png() -> Vec<u8> {
        let mut buf = Vec::new();
        image::RgbImage::new(4, 4)
            .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("encode test png");
        buf
    }

    fn multipart_file_body(field_name: &str, filename: Option<&str>, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{name}\"\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{field_name}\"\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn predict_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/predict")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ── health ──

    #[tokio::test]
    async fn health_reports_online() {
        let app = test_router(Arc::new(MockProvider::replying("unused")));
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "online");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = test_router(Arc::new(MockProvider::replying("unused")));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ── /predict ──

    #[tokio::test]
    async fn predict_without_file_is_400_and_skips_provider() {
        let mock = Arc::new(MockProvider::replying(FENCED_TOMATO_REPLY));
        let app = test_router(mock.clone());

        // A form with only a text field — no identifiable file.
        let body = multipart_file_body("note", None, b"just text");
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "no image uploaded");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn predict_truncated_multipart_is_400_with_distinct_message() {
        let mock = Arc::new(MockProvider::replying(FENCED_TOMATO_REPLY));
        let app = test_router(mock.clone());

        // A body that never produces a valid part: declared boundary, then a
        // file part that is cut off before its closing boundary.
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"file\"; filename=\"leaf.png\"\r\n\r\n",
        );
        body.extend_from_slice(b"truncated");
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert_ne!(json["message"], "no image uploaded");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn predict_parses_fenced_reply_into_diagnosis() {
        let mock = Arc::new(MockProvider::replying(FENCED_TOMATO_REPLY));
        let app = test_router(mock.clone());

        let body = multipart_file_body("file", Some("leaf.png"), &sample_png());
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["v"], "Tomato");
        assert_eq!(json["data"]["d"], "Early Blight");
        assert_eq!(json["data"]["t"], "Apply copper fungicide weekly.");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn predict_accepts_any_field_with_a_filename() {
        let mock = Arc::new(MockProvider::replying(FENCED_TOMATO_REPLY));
        let app = test_router(mock);

        let body = multipart_file_body("photo", Some("leaf.png"), &sample_png());
        let response = app.oneshot(predict_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn predict_undecodable_image_is_500_without_provider_call() {
        let mock = Arc::new(MockProvider::replying(FENCED_TOMATO_REPLY));
        let app = test_router(mock.clone());

        let body = multipart_file_body("file", Some("leaf.png"), b"definitely not an image");
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn predict_surfaces_provider_failure_detail() {
        let mock = Arc::new(MockProvider::failing("model overloaded"));
        let app = test_router(mock);

        let body = multipart_file_body("file", Some("leaf.png"), &sample_png());
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(
            json["message"].as_str().unwrap().contains("model overloaded"),
            "detail should be surfaced: {json}"
        );
    }

    #[tokio::test]
    async fn predict_unusable_reply_is_an_error_not_a_default() {
        let mock = Arc::new(MockProvider::replying("The plant looks fine to me!"));
        let app = test_router(mock);

        let body = multipart_file_body("file", Some("leaf.png"), &sample_png());
        let response = app.oneshot(predict_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(
            json["message"].as_str().unwrap().contains("not valid JSON"),
            "got: {json}"
        );
    }

    // ── /generate_pdf ──

    fn pdf_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/generate_pdf")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn generate_pdf_returns_attachment_named_after_subject() {
        let app = test_router(Arc::new(MockProvider::replying("unused")));
        let response = app
            .oneshot(pdf_request(
                r#"{"v":"Tomato","d":"Early Blight","t":"Apply copper fungicide weekly."}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/pdf"
        );
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"), "{disposition}");
        assert!(disposition.contains("Tomato"), "{disposition}");

        let bytes = to_bytes(response.into_body(), 4 * 1024 * 1024).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn generate_pdf_fills_missing_fields_with_defaults() {
        let app = test_router(Arc::new(MockProvider::replying("unused")));
        let response = app
            .oneshot(pdf_request(r#"{"v":"Tomato"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn generate_pdf_with_empty_body_uses_all_defaults() {
        let app = test_router(Arc::new(MockProvider::replying("unused")));
        let response = app.oneshot(pdf_request("{}")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Unknown_Plant"), "{disposition}");
    }

    #[tokio::test]
    async fn generate_pdf_without_body_still_succeeds() {
        let app = test_router(Arc::new(MockProvider::replying("unused")));
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate_pdf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // ── end-to-end: /predict output feeds /generate_pdf ──

    #[tokio::test]
    async fn diagnosis_output_round_trips_into_a_report() {
        let mock = Arc::new(MockProvider::replying(FENCED_TOMATO_REPLY));
        let app = test_router(mock);

        let body = multipart_file_body("file", Some("leaf.jpg"), &sample_png());
        let response = app
            .clone()
            .oneshot(predict_request(body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        let record = serde_json::to_string(&json["data"]).unwrap();

        let response = app.oneshot(pdf_request(&record)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("Tomato"), "{disposition}");
    }
}
