#![forbid(unsafe_code)]

use poem_openapi::{ OpenApi, payload::Json, Object };

pub struct HealthApi;

#[derive(Object, Debug)]
struct RespHealth
{
    status: String,
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl HealthApi {
    // Liveness and readiness probes hit this constantly, so it is
    // intentionally left out of app_requests_total.
    #[oai(path = "/health", method = "get")]
    async fn get_health(&self) -> Json<RespHealth> {
        Json(RespHealth {status: "healthy".to_string()})
    }
}
