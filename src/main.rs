#![forbid(unsafe_code)]

use std::sync::Arc;

use anyhow::Result;
use log::info;
use poem::listener::TcpListener;

use crate::api::build_app;
use crate::utils::config::{init_log, init_runtime_context, RuntimeCtx};
use crate::utils::errors::Errors;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "UsersServer"; // for poem logging
const SERVER_ADDR : &str = "0.0.0.0:8080";

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // Announce ourselves.
    println!("Starting users_server!");

    // Initialize logging and the shared runtime context.  Nothing can be
    // served without them, so failures end the process here.
    let ctx = server_init().map_err(|e| std::io::Error::other(e.to_string()))?;

    // ------------------ Main Loop -------------------
    info!("Listening on {}.", SERVER_ADDR);
    poem::Server::new(TcpListener::bind(SERVER_ADDR))
        .name(SERVER_NAME)
        .run(build_app(ctx))
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// server_init:
// ---------------------------------------------------------------------------
/** Initialize the log and build the runtime context shared by all handlers. */
fn server_init() -> Result<Arc<RuntimeCtx>> {
    init_log()?;

    let ctx = init_runtime_context()?;
    info!("{}", Errors::InputParms(format!("{:#?}", ctx)));

    print_version_info();
    Ok(Arc::new(ctx))
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("{}.", format!("\n*** Running USERS_SERVER={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}",
                        option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
                        env!("GIT_BRANCH"),
                        env!("GIT_COMMIT_SHORT"),
                        env!("GIT_DIRTY"),
                        env!("SOURCE_TIMESTAMP"),
                        env!("RUSTC_VERSION")),
    );
}
