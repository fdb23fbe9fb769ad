#![forbid(unsafe_code)]

use log::{debug, warn};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::Connection;
use std::str::FromStr;

use crate::utils::config::DbConfig;
use crate::utils::errors::Errors;

// ***************************************************************************
//                             Connection Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// connect_options:
// ---------------------------------------------------------------------------
/** Translate the raw configuration into sqlx connect options.  This is where
 * the port and ssl mode get validated, so failures here are reported the same
 * way as a refused connection.
 */
pub fn connect_options(cfg: &DbConfig) -> Result<PgConnectOptions, Errors> {
    let port: u16 = cfg.port.parse().map_err(|e| {
        Errors::ConnectionError(format!("invalid port '{}': {}", cfg.port, e))
    })?;
    let sslmode = PgSslMode::from_str(&cfg.sslmode).map_err(|e| {
        Errors::ConnectionError(format!("invalid ssl mode '{}': {}", cfg.sslmode, e))
    })?;

    let mut options = PgConnectOptions::new()
        .host(&cfg.host)
        .port(port)
        .ssl_mode(sslmode);
    if let Some(dbname) = &cfg.dbname {
        options = options.database(dbname);
    }
    if let Some(user) = &cfg.user {
        options = options.username(user);
    }
    if let Some(password) = &cfg.password {
        options = options.password(password);
    }
    if let Some(cert) = &cfg.sslrootcert {
        options = options.ssl_root_cert(cert);
    }
    Ok(options)
}

// ---------------------------------------------------------------------------
// connect:
// ---------------------------------------------------------------------------
/** Open a new connection.  There's no pool and no retry: every caller gets
 * its own connection and must hand it back to `release` when done.
 */
pub async fn connect(cfg: &DbConfig) -> Result<PgConnection, Errors> {
    let options = connect_options(cfg)?;
    let conn = PgConnection::connect_with(&options)
        .await
        .map_err(|e| Errors::ConnectionError(e.to_string()))?;
    debug!("Opened database connection to {}:{}.", cfg.host, cfg.port);
    Ok(conn)
}

// ---------------------------------------------------------------------------
// release:
// ---------------------------------------------------------------------------
/** Close the connection gracefully.  A failed close only gets logged since
 * the socket is dropped either way.
 */
pub async fn release(conn: PgConnection) {
    if let Err(e) = conn.close().await {
        warn!("Error closing database connection: {}", e);
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use crate::utils::config::DbConfig;
    use crate::utils::db::{connect, connect_options};
    use crate::utils::errors::Errors;

    fn refused_config() -> DbConfig {
        DbConfig {
            host: "127.0.0.1".to_string(),
            port: "1".to_string(),
            sslmode: "disable".to_string(),
            ..DbConfig::default()
        }
    }

    #[test]
    fn defaults_build_options() {
        assert!(connect_options(&DbConfig::default()).is_ok());
    }

    #[test]
    fn bad_port_is_a_connection_error() {
        let cfg = DbConfig {port: "fifty".to_string(), ..DbConfig::default()};
        match connect_options(&cfg) {
            Err(Errors::ConnectionError(msg)) => assert!(msg.contains("fifty")),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn bad_sslmode_is_a_connection_error() {
        let cfg = DbConfig {sslmode: "sometimes".to_string(), ..DbConfig::default()};
        assert!(matches!(connect_options(&cfg), Err(Errors::ConnectionError(_))));
    }

    #[test]
    fn every_libpq_sslmode_is_accepted() {
        for mode in ["disable", "allow", "prefer", "require", "verify-ca", "verify-full"] {
            let cfg = DbConfig {sslmode: mode.to_string(), ..DbConfig::default()};
            assert!(connect_options(&cfg).is_ok(), "mode {} rejected", mode);
        }
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let result = connect(&refused_config()).await;
        assert!(matches!(result, Err(Errors::ConnectionError(_))));
    }
}
