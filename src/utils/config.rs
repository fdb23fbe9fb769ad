#![forbid(unsafe_code)]

use anyhow::{Result, anyhow};
use log::{info, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::{env, fmt, path::Path};

use crate::utils::errors::Errors;
use crate::utils::metrics::Metrics;

// ***************************************************************************
//                                Constants
// ***************************************************************************
// Database connection environment variables.
pub const ENV_DB_HOST        : &str = "DB_HOST";
pub const ENV_DB_PORT        : &str = "DB_PORT";
pub const ENV_DB_NAME        : &str = "DB_NAME";
pub const ENV_DB_USER        : &str = "DB_USER";
pub const ENV_DB_PASSWORD    : &str = "DB_PASSWORD";
pub const ENV_DB_SSLMODE     : &str = "DB_SSLMODE";
pub const ENV_SSL_ROOT_CERT  : &str = "SSL_ROOT_CERT";

// Defaults applied when the corresponding variable is unset.
const DEFAULT_DB_HOST        : &str = "localhost";
const DEFAULT_DB_PORT        : &str = "5432";
const DEFAULT_DB_SSLMODE     : &str = "require";

// Logging.
const ENV_LOG4RS_CONFIG      : &str = "LOG4RS_CONFIG";
const DEFAULT_LOG4RS_CONFIG  : &str = "config/log4rs.yml";
const DEFAULT_LOG_PATTERN    : &str = "{d} {l} {t} - {m}{n}";

// ***************************************************************************
//                               Config Structs
// ***************************************************************************
// ---------------------------------------------------------------------------
// DbConfig:
// ---------------------------------------------------------------------------
/** Connection parameters for the users database.  Values are kept exactly as
 * they appear in the environment; nothing is validated until a connection is
 * attempted, so a bad port or ssl mode only surfaces on the first /users call.
 */
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: String,
    pub dbname: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub sslmode: String,
    pub sslrootcert: Option<String>,
}

impl DbConfig {
    /// Read the connection parameters from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config using an arbitrary variable lookup, applying the
    /// same defaults as `from_env`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup(ENV_DB_HOST).unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            port: lookup(ENV_DB_PORT).unwrap_or_else(|| DEFAULT_DB_PORT.to_string()),
            dbname: lookup(ENV_DB_NAME),
            user: lookup(ENV_DB_USER),
            password: lookup(ENV_DB_PASSWORD),
            sslmode: lookup(ENV_DB_SSLMODE).unwrap_or_else(|| DEFAULT_DB_SSLMODE.to_string()),
            sslrootcert: lookup(ENV_SSL_ROOT_CERT),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

// The runtime context is logged at startup, so keep the password out of it.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .field("sslmode", &self.sslmode)
            .field("sslrootcert", &self.sslrootcert)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// RuntimeCtx:
// ---------------------------------------------------------------------------
/** Everything the handlers share.  Built once in main and handed to the
 * routes behind an Arc.
 */
#[derive(Debug)]
pub struct RuntimeCtx {
    pub db: DbConfig,
    pub metrics: Metrics,
}

// ***************************************************************************
//                               Log Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_log:
// ---------------------------------------------------------------------------
/** Initialize log4rs from the file named by LOG4RS_CONFIG, or from the
 * default location.  If no file exists we fall back to a console appender
 * at info level.  A file that exists but can't be loaded is an error.
 */
pub fn init_log() -> Result<()> {
    let logconfig = env::var(ENV_LOG4RS_CONFIG).unwrap_or_else(|_| DEFAULT_LOG4RS_CONFIG.to_string());
    if Path::new(&logconfig).exists() {
        if let Err(e) = log4rs::init_file(&logconfig, Default::default()) {
            return Result::Err(anyhow!("{}\n   {}", Errors::Log4rsInitialization(logconfig), e));
        }
        info!("Log4rs initialized using: {}", logconfig);
        return Ok(());
    }

    // No configuration file, use the built-in console configuration.
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(DEFAULT_LOG_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
        .map_err(|e| anyhow!("{}\n   {}", Errors::Log4rsInitialization(logconfig.clone()), e))?;
    log4rs::init_config(config)
        .map_err(|e| anyhow!("{}\n   {}", Errors::Log4rsInitialization(logconfig.clone()), e))?;
    info!("Log4rs initialized with console defaults, {} not found.", logconfig);
    Ok(())
}

// ***************************************************************************
//                             Config Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// init_runtime_context:
// ---------------------------------------------------------------------------
pub fn init_runtime_context() -> Result<RuntimeCtx> {
    let db = DbConfig::from_env();
    let metrics = Metrics::new()?;
    Ok(RuntimeCtx {db, metrics})
}
