//! HTTP route definitions

use crate::{handlers, middleware, AppState};
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, head, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Service endpoints
        .route("/", head(handlers::health_check))
        .route("/health", get(handlers::health_check))
        .route("/time", get(handlers::current_time))
        // File endpoints
        .route("/upload", post(handlers::upload_file))
        .route("/download/{*key}", get(handlers::download_file))
        .route("/list", get(handlers::list_files))
        // Bucket endpoints
        .route("/buckets", get(handlers::list_buckets))
        .route("/bucket/{name}", post(handlers::ensure_bucket))
        // Apply middleware
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware));

    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any);
        router.layer(cors)
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayConfig;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use fnstack_store::MemoryObjectStore;
    use tower::ServiceExt;

    const BOUNDARY: &str = "fnstack-test-boundary";

    async fn app() -> Router {
        let config = GatewayConfig {
            bucket_name: "files".to_string(),
            ..Default::default()
        };
        let state = AppState::with_store(config, Arc::new(MemoryObjectStore::new()));
        state.gateway.ensure_bucket("files").await.unwrap();
        create_router(Arc::new(state))
    }

    /// Build a multipart body from (name, part filename, value) triples
    fn form(parts: &[(&str, Option<&str>, &str)]) -> Body {
        let mut body = String::new();
        for (name, file_name, value) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match file_name {
                Some(file_name) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(value);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    fn upload_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(form(parts))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_list_download() {
        let app = app().await;

        let response = app
            .clone()
            .oneshot(upload_request(&[
                ("file", Some("blob"), "hello"),
                ("filename", None, "README.md"),
                ("mimetype", None, "text/plain"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "key": "README.md", "size": 5 })
        );

        let response = app.clone().oneshot(get_request("/list")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{ "objectKey": "README.md", "size": 5 }])
        );

        let response = app.clone().oneshot(get_request("/download/README.md")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"README.md\""
        );
        assert_eq!(body_text(response).await, "hello");
    }

    #[test_log::test(tokio::test)]
    async fn test_download_nested_key() {
        let app = app().await;
        app.clone()
            .oneshot(upload_request(&[
                ("file", Some("blob"), "# guide"),
                ("filename", None, "docs/guide.md"),
                ("mimetype", None, "text/markdown"),
            ]))
            .await
            .unwrap();

        let response = app.oneshot(get_request("/download/docs/guide.md")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "# guide");
    }

    #[test_log::test(tokio::test)]
    async fn test_download_missing() {
        let response = app().await.oneshot(get_request("/download/missing.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NoSuchKey");
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_without_file_part() {
        let response = app()
            .await
            .oneshot(upload_request(&[
                ("filename", None, "README.md"),
                ("mimetype", None, "text/plain"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "MissingContent");
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_invalid_mimetype() {
        let response = app()
            .await
            .oneshot(upload_request(&[
                ("file", Some("blob"), "hello"),
                ("filename", None, "README.md"),
                ("mimetype", None, "aa"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "InvalidMimetype");
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_traversal_filename() {
        let response = app()
            .await
            .oneshot(upload_request(&[
                ("file", Some("blob"), "hello"),
                ("filename", None, "../etc/passwd"),
                ("mimetype", None, "text/plain"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body_json(response).await["code"], "InvalidFilename");
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_falls_back_to_part_name() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(upload_request(&[
                ("file", Some("notes.txt"), "abc"),
                ("mimetype", None, "text/plain"),
            ]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app.oneshot(get_request("/download/notes.txt")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test_log::test(tokio::test)]
    async fn test_upload_not_multipart() {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "MalformedRequest");
    }

    #[test_log::test(tokio::test)]
    async fn test_ensure_bucket_twice() {
        let app = app().await;
        for _ in 0..2 {
            let request = Request::builder()
                .method("POST")
                .uri("/bucket/archive")
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_text(response).await, "Have created bucket archive");
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_health_and_time() {
        let app = app().await;

        let response = app.clone().oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let head = Request::builder().method("HEAD").uri("/").body(Body::empty()).unwrap();
        assert_eq!(app.clone().oneshot(head).await.unwrap().status(), StatusCode::OK);

        let response = app.oneshot(get_request("/time")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(", "));
    }

    #[test_log::test(tokio::test)]
    async fn test_list_missing_bucket_is_not_found() {
        let config = GatewayConfig {
            bucket_name: "absent".to_string(),
            ..Default::default()
        };
        let state = AppState::with_store(config, Arc::new(MemoryObjectStore::new()));
        let app = create_router(Arc::new(state));

        let response = app.oneshot(get_request("/list")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "NoSuchBucket");
    }

    #[test_log::test(tokio::test)]
    async fn test_responses_carry_request_id() {
        let response = app().await.oneshot(get_request("/health")).await.unwrap();
        assert!(response.headers().contains_key(middleware::REQUEST_ID_HEADER));
    }

    #[test_log::test(tokio::test)]
    async fn test_error_body_matches_request_id_header() {
        let response = app().await.oneshot(get_request("/download/missing.txt")).await.unwrap();
        let header_id = response.headers()[middleware::REQUEST_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();

        assert_eq!(body_json(response).await["requestId"], header_id);
    }

    #[test_log::test(tokio::test)]
    async fn test_list_buckets() {
        let app = app().await;
        let request = Request::builder()
            .method("POST")
            .uri("/bucket/archive")
            .body(Body::empty())
            .unwrap();
        app.clone().oneshot(request).await.unwrap();

        let response = app.oneshot(get_request("/buckets")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!(["archive", "files"]));
    }
}
