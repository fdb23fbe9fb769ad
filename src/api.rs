#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::{get, Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

use crate::utils::config::RuntimeCtx;

pub mod health;
pub mod hello;
pub mod metrics;
pub mod users;

use health::HealthApi;
use hello::HelloApi;
use users::UsersApi;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const API_TITLE   : &str = "Users Server";
const API_VERSION : &str = env!("CARGO_PKG_VERSION");

// Label values shared by the handlers that record request counts.
pub const METHOD_GET  : &str = "GET";
pub const STATUS_OK   : u16  = 200;

// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble the complete route table.  The JSON endpoints live in the openapi
 * service; /metrics is a plain poem handler since it returns prometheus text.
 * Every handler reaches the shared runtime context through poem's Data
 * extractor.  Anything not listed here gets poem's default 404.
 */
pub fn build_app(ctx: Arc<RuntimeCtx>) -> impl Endpoint {
    let endpoints = (HelloApi, UsersApi, HealthApi);
    let api_service = OpenApiService::new(endpoints, API_TITLE, API_VERSION);

    Route::new()
        .nest("/", api_service)
        .at("/metrics", get(metrics::get_metrics))
        .data(ctx)
}

// ***************************************************************************
//                               Test Support
// ***************************************************************************
#[cfg(test)]
pub(crate) fn test_ctx(db: crate::utils::config::DbConfig) -> Arc<RuntimeCtx> {
    let metrics = crate::utils::metrics::Metrics::new().unwrap();
    Arc::new(RuntimeCtx {db, metrics})
}
