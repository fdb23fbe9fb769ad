#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{ OpenApi, payload::Json, Object };

use crate::api::{METHOD_GET, STATUS_OK};
use crate::utils::config::RuntimeCtx;

const GREETING: &str = "Hello, Sherpany!";

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct HelloApi;

#[derive(Object, Debug)]
struct RespHello
{
    #[oai(rename = "Message")]
    message: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl HelloApi {
    #[oai(path = "/", method = "get")]
    async fn get_hello(&self, ctx: Data<&Arc<RuntimeCtx>>) -> Json<RespHello> {
        ctx.metrics.record_request("/", METHOD_GET, STATUS_OK);
        Json(RespHello::new())
    }
}

impl RespHello {
    fn new() -> Self {
        Self {message: GREETING.to_string()}
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::test::TestClient;
    use serde_json::json;

    use crate::api::{build_app, test_ctx};
    use crate::utils::config::DbConfig;

    #[tokio::test]
    async fn greeting_is_counted_once() {
        let ctx = test_ctx(DbConfig::default());
        let cli = TestClient::new(build_app(ctx.clone()));

        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        resp.assert_json(json!({"Message": "Hello, Sherpany!"})).await;
        assert_eq!(ctx.metrics.request_count("/", "GET", 200), 1);

        cli.get("/").send().await.assert_status_is_ok();
        assert_eq!(ctx.metrics.request_count("/", "GET", 200), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parallel_greetings_lose_no_updates() {
        let ctx = test_ctx(DbConfig::default());
        let cli = std::sync::Arc::new(TestClient::new(build_app(ctx.clone())));

        let tasks: Vec<_> = (0..100)
            .map(|_| {
                let cli = cli.clone();
                tokio::spawn(async move { cli.get("/").send().await.0.status() })
            })
            .collect();
        for status in futures::future::join_all(tasks).await {
            assert_eq!(status.unwrap(), poem::http::StatusCode::OK);
        }
        assert_eq!(ctx.metrics.request_count("/", "GET", 200), 100);
    }
}
