#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error};
use poem::web::Data;
use poem_openapi::{ OpenApi, payload::Json, Object, ApiResponse };
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::Row;

use crate::api::{METHOD_GET, STATUS_OK};
use crate::utils::config::RuntimeCtx;
use crate::utils::db;
use crate::utils::db_statements::LIST_USERS;
use crate::utils::errors::{Errors, HttpResult};
use crate::utils::metrics::Metrics;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct UsersApi;

#[derive(Object, Debug, Clone, PartialEq, Eq)]
pub struct UsersListElement
{
    id: i64,
    name: Option<String>,
    email: Option<String>,
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum UsersResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<UsersListElement>>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(users: Vec<UsersListElement>) -> UsersResponse {
    UsersResponse::Http200(Json(users))
}
fn make_http_500() -> UsersResponse {
    UsersResponse::Http500(Json(HttpResult::internal_error()))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl UsersApi {
    #[oai(path = "/users", method = "get")]
    async fn get_users(&self, ctx: Data<&Arc<RuntimeCtx>>) -> UsersResponse {
        match list_users(ctx.0).await {
            Ok(users) => {
                // Only successful fetches are counted.
                ctx.metrics.record_request("/users", METHOD_GET, STATUS_OK);
                make_http_200(users)
            },
            Err(e) => {
                // The details stay in the log, the client gets a generic body.
                error!("ERROR: /users failed: {}", e);
                make_http_500()
            }
        }
    }
}

// ***************************************************************************
//                          Request/Response Methods
// ***************************************************************************
impl UsersListElement {
    fn new(id: i64, name: Option<String>, email: Option<String>) -> Self {
        Self {id, name, email}
    }

    /// Map one result row, columns in id, name, email order.  NULL text
    /// columns are passed through as JSON null.
    fn from_row(row: &PgRow) -> Result<Self, Errors> {
        let id = get_id(row).map_err(|e| Errors::SerializationError(e.to_string()))?;
        let name = row.try_get(1).map_err(|e| Errors::SerializationError(e.to_string()))?;
        let email = row.try_get(2).map_err(|e| Errors::SerializationError(e.to_string()))?;
        Ok(Self::new(id, name, email))
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// list_users:
// ---------------------------------------------------------------------------
/** Open a connection, run the users query and close the connection.  The
 * query result is held until after the close so that every path through
 * here releases the connection, including query and row mapping failures.
 */
async fn list_users(ctx: &RuntimeCtx) -> Result<Vec<UsersListElement>> {
    let mut conn = db::connect(&ctx.db).await?;
    let result = select_users(&mut conn, &ctx.metrics).await;
    db::release(conn).await;

    let users = result?;
    debug!("Retrieved {} user records.", users.len());
    Ok(users)
}

// ---------------------------------------------------------------------------
// select_users:
// ---------------------------------------------------------------------------
async fn select_users(conn: &mut PgConnection, metrics: &Metrics) -> Result<Vec<UsersListElement>, Errors> {
    metrics.record_query(LIST_USERS);
    let rows = sqlx::query(LIST_USERS)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| Errors::QueryError(e.to_string()))?;

    rows.iter().map(UsersListElement::from_row).collect()
}

// ---------------------------------------------------------------------------
// get_id:
// ---------------------------------------------------------------------------
// Accept integer, bigint and smallint id columns.
fn get_id(row: &PgRow) -> Result<i64, sqlx::Error> {
    if let Ok(id) = row.try_get::<i32, _>(0) {
        return Ok(i64::from(id));
    }
    if let Ok(id) = row.try_get::<i16, _>(0) {
        return Ok(i64::from(id));
    }
    row.try_get::<i64, _>(0)
}
