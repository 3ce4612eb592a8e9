//! One log line per request.
//!
//! Only the method, path, status and latency are recorded. Query strings,
//! headers and bodies never reach the log.

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use log::{info, warn};
use std::time::{Duration, Instant};

pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;
    let line = access_line(&method, &path, response.status(), started.elapsed());
    if response.status().is_server_error() {
        warn!("{line}");
    } else {
        info!("{line}");
    }
    response
}

fn access_line(method: &Method, path: &str, status: StatusCode, elapsed: Duration) -> String {
    format!(
        "event=http_request module=server method={method} path={path} status={} elapsed_ms={}",
        status.as_u16(),
        elapsed.as_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::{access_line, log_request};
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, Uri};
    use axum::routing::get;
    use axum::{middleware, Router};
    use std::time::Duration;
    use tower::ServiceExt;

    #[test]
    fn line_carries_request_metadata() {
        let uri: Uri = "/api/interns?search=priya".parse().unwrap();
        let line = access_line(
            &Method::GET,
            uri.path(),
            StatusCode::OK,
            Duration::from_millis(12),
        );
        assert_eq!(
            line,
            "event=http_request module=server method=GET path=/api/interns status=200 elapsed_ms=12"
        );
    }

    #[tokio::test]
    async fn layer_passes_responses_through() {
        let app = Router::new()
            .route("/teapot", get(|| async { (StatusCode::IM_A_TEAPOT, "short and stout") }))
            .layer(middleware::from_fn(log_request));
        let response = app
            .oneshot(Request::builder().uri("/teapot").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
