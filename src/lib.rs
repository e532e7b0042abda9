use std::sync::Arc;

use axum::{middleware, routing::post, Router};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;
pub mod stdio;
pub mod wolfram_client;

use mcp::server::Dispatcher;

/// Every path accepts a POST carrying one request; other methods get 405.
pub fn build_app(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new()
        .route("/", post(http::handlers::mcp_endpoint))
        .route("/{*path}", post(http::handlers::mcp_endpoint))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(dispatcher)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::wolfram_client::{Pod, QueryError, QueryProvider, QueryResult, Subpod};

    use super::*;

    struct MockProvider;

    #[async_trait::async_trait]
    impl QueryProvider for MockProvider {
        async fn query(&self, input: &str) -> Result<QueryResult, QueryError> {
            if input == "fail" {
                return Err(QueryError::Status {
                    status: 500,
                    body: "upstream down".to_string(),
                });
            }

            Ok(QueryResult {
                success: true,
                error: false,
                numpods: 1,
                pods: vec![Pod {
                    title: "Result".to_string(),
                    subpods: vec![Subpod {
                        plaintext: "4".to_string(),
                        ..Subpod::default()
                    }],
                    ..Pod::default()
                }],
            })
        }
    }

    fn app() -> Router {
        build_app(Arc::new(Dispatcher::with_query_provider(Some(Arc::new(
            MockProvider,
        )))))
    }

    fn unconfigured_app() -> Router {
        build_app(Arc::new(Dispatcher::with_query_provider(None)))
    }

    fn post_json(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request build")
    }

    async fn body_bytes(response: axum::response::Response) -> axum::body::Bytes {
        response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes()
    }

    #[tokio::test]
    async fn get_is_method_not_allowed_with_empty_body() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("GET")
                    .body(Body::empty())
                    .expect("request build"),
            )
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(body_bytes(response).await.is_empty());
    }

    #[tokio::test]
    async fn put_is_method_not_allowed() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .method("PUT")
                    .body(Body::from(r#"{"method":"ping","id":1}"#))
                    .expect("request build"),
            )
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error_without_id() {
        let response = app()
            .oneshot(post_json("/", "{\"method\": \"ping\", \"id\": 1"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&header::HeaderValue::from_static("application/json"))
        );
        let body = body_bytes(response).await;
        assert_eq!(body, "{\"error\":{\"code\":-32700,\"message\":\"Parse error\"}}");
    }

    #[tokio::test]
    async fn empty_body_is_parse_error() {
        let response = app()
            .oneshot(post_json("/", ""))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body_json: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("valid json response");
        assert_eq!(body_json["error"]["code"], -32700);
        assert!(body_json.get("id").is_none());
    }

    #[tokio::test]
    async fn null_method_echoes_id_with_method_not_found() {
        let response = app()
            .oneshot(post_json("/", r#"{"method":null,"id":1}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        assert_eq!(
            body,
            "{\"error\":{\"code\":-32601,\"message\":\"Method not found\"},\"id\":1}"
        );
    }

    #[tokio::test]
    async fn null_body_is_method_not_found() {
        let response = app()
            .oneshot(post_json("/", "null"))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        assert_eq!(
            body,
            "{\"error\":{\"code\":-32601,\"message\":\"Method not found\"}}"
        );
    }

    #[tokio::test]
    async fn trailing_content_after_request_is_parse_error() {
        let response = app()
            .oneshot(post_json("/", r#"{"method":"ping","id":1}{"method":"ping","id":2}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body_json: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("valid json response");
        assert_eq!(body_json["error"]["code"], -32700);
        assert!(body_json.get("id").is_none());
    }

    #[tokio::test]
    async fn unknown_method_is_ok_with_error_envelope() {
        let response = app()
            .oneshot(post_json("/", r#"{"method":"unknown","id":1}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&header::HeaderValue::from_static("application/json"))
        );
        let body = body_bytes(response).await;
        assert_eq!(
            body,
            "{\"error\":{\"code\":-32601,\"message\":\"Method not found\"},\"id\":1}"
        );
    }

    #[tokio::test]
    async fn ping_returns_pong() {
        let response = app()
            .oneshot(post_json("/", r#"{"method":"ping","id":"p-1"}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        assert_eq!(body, "{\"result\":{\"pong\":true},\"id\":\"p-1\"}");
    }

    #[tokio::test]
    async fn any_path_accepts_post() {
        let response = app()
            .oneshot(post_json("/mcp", r#"{"method":"server_info","id":4}"#))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body_json: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("valid json response");
        assert_eq!(body_json["result"]["type"], "wolfram");
    }

    #[tokio::test]
    async fn initialize_returns_capabilities() {
        let response = app()
            .oneshot(post_json(
                "/",
                r#"{"method":"initialize","id":1,"params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test-client","version":"1.0.0"}}}"#,
            ))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body_json: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("valid json response");

        assert_eq!(body_json["id"], 1);
        assert_eq!(body_json["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(body_json["result"]["capabilities"]["tools"], true);
        assert_eq!(body_json["result"]["serverInfo"]["name"], "MCP Wolfram Server");
    }

    #[tokio::test]
    async fn tools_call_returns_formatted_text() {
        let response = app()
            .oneshot(post_json(
                "/",
                r#"{"method":"tools/call","id":3,"params":{"name":"query_wolfram","arguments":{"query":"2+2"}}}"#,
            ))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body_json: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("valid json response");

        assert_eq!(body_json["id"], 3);
        assert_eq!(body_json["result"]["content"][0]["type"], "text");
        assert_eq!(
            body_json["result"]["content"][0]["text"],
            "Wolfram Alpha Result (1 sections):\n\n=== Result ===\n4\n\n"
        );
    }

    #[tokio::test]
    async fn tools_call_failure_stays_http_ok() {
        let response = app()
            .oneshot(post_json(
                "/",
                r#"{"method":"tools/call","id":5,"params":{"name":"query_wolfram","arguments":{"query":"fail"}}}"#,
            ))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body_json: serde_json::Value =
            serde_json::from_slice(&body_bytes(response).await).expect("valid json response");

        assert_eq!(body_json["id"], 5);
        assert_eq!(body_json["error"]["code"], -32603);
        assert_eq!(
            body_json["error"]["message"],
            "Wolfram query failed: Wolfram Alpha API error: status 500, upstream down"
        );
    }

    #[tokio::test]
    async fn tools_call_without_key_is_internal_error() {
        let response = unconfigured_app()
            .oneshot(post_json(
                "/",
                r#"{"method":"tools/call","id":6,"params":{"name":"query_wolfram","arguments":{"query":"2+2"}}}"#,
            ))
            .await
            .expect("request execution");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_bytes(response).await;
        assert_eq!(
            body,
            "{\"error\":{\"code\":-32603,\"message\":\"Wolfram Alpha API key not configured\"},\"id\":6}"
        );
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_dispatcher() {
        let app = app();
        let mut handles = Vec::new();

        for _ in 0..16 {
            let app = app.clone();
            handles.push(tokio::spawn(async move {
                let response = app
                    .oneshot(post_json(
                        "/",
                        r#"{"method":"tools/call","id":7,"params":{"name":"query_wolfram","arguments":{"query":"2+2"}}}"#,
                    ))
                    .await
                    .expect("request execution");
                let body = body_bytes(response).await;
                serde_json::from_slice::<serde_json::Value>(&body).expect("valid json response")
            }));
        }

        for handle in handles {
            let body_json = handle.await.expect("task join");
            assert_eq!(body_json["id"], 7);
            assert!(body_json.get("error").is_none());
        }
    }
}
