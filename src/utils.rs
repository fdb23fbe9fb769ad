pub mod config;
pub mod db;
pub mod db_statements;
pub mod errors;
pub mod metrics;
