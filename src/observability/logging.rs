use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat};
use crate::error::AppError;

pub fn init_tracing(config: &Config) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|err| AppError::Config(format!("invalid LOG_LEVEL: {err}")))?;

    let result = match config.log_format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init(),
    };

    result.map_err(|err| AppError::Internal(format!("failed to install tracing subscriber: {err}")))
}
