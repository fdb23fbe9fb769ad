#![forbid(unsafe_code)]

use std::sync::Arc;

use log::error;
use poem::http::StatusCode;
use poem::web::Data;
use poem::{handler, Response};

use crate::utils::config::RuntimeCtx;
use crate::utils::errors::GENERIC_ERROR_MSG;

// ---------------------------------------------------------------------------
// get_metrics:
// ---------------------------------------------------------------------------
/** Serve the registry in the prometheus text exposition format.  Scrapes are
 * not themselves counted.
 */
#[handler]
pub async fn get_metrics(ctx: Data<&Arc<RuntimeCtx>>) -> Response {
    match ctx.metrics.render() {
        Ok(body) => Response::builder()
            .status(StatusCode::OK)
            .content_type(ctx.metrics.content_type())
            .body(body),
        Err(e) => {
            error!("ERROR: unable to render metrics: {}", e);
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(GENERIC_ERROR_MSG)
        }
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::test::TestClient;

    use crate::api::{build_app, test_ctx};
    use crate::utils::config::DbConfig;

    #[tokio::test]
    async fn reports_root_request_count() {
        let ctx = test_ctx(DbConfig::default());
        let cli = TestClient::new(build_app(ctx.clone()));

        for _ in 0..5 {
            cli.get("/").send().await.assert_status_is_ok();
        }
        cli.get("/health").send().await.assert_status_is_ok();

        let resp = cli.get("/metrics").send().await;
        resp.assert_status_is_ok();
        resp.assert_content_type("text/plain; version=0.0.4");
        let body = resp.0.into_body().into_string().await.unwrap();
        assert!(body.contains("app_requests_total{endpoint=\"/\",method=\"GET\",status_code=\"200\"} 5"));
        assert!(!body.contains("endpoint=\"/health\""));
        assert!(!body.contains("endpoint=\"/metrics\""));
    }

    #[tokio::test]
    async fn empty_registry_renders() {
        let cli = TestClient::new(build_app(test_ctx(DbConfig::default())));
        let resp = cli.get("/metrics").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.unwrap();
        assert!(!body.contains("app_requests_total{"));
    }
}
