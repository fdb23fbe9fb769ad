#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("users_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible or unparsable logger configuration file.
    #[error("Unable to initialize Log4rs from configuration file: {}", .0)]
    Log4rsInitialization(String),

    /// The database could not be reached or refused our credentials.
    #[error("Database connection error: {}", .0)]
    ConnectionError(String),

    /// A statement failed to execute.
    #[error("Database query error: {}", .0)]
    QueryError(String),

    /// A result row could not be converted into a response object.
    #[error("Row serialization error: {}", .0)]
    SerializationError(String),

    #[error("Metrics registry error: {}", .0)]
    MetricsError(#[from] prometheus::Error),
}

// ***************************************************************************
//                             HTTP Error Body
// ***************************************************************************
// Body returned with every non-200 response.  The message is always generic;
// error details go to the log, never to the client.
pub const GENERIC_ERROR_MSG: &str = "Internal server error.";

#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self {result_code, result_msg}
    }

    /// The one failure body this service emits.
    pub fn internal_error() -> Self {
        Self::new(500.to_string(), GENERIC_ERROR_MSG.to_string())
    }
}
