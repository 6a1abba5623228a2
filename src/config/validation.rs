use crate::config::types::{Config, OutputConfig, PacingConfig, RemoteConfig};
use crate::extract::PageExtractor;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_remote_config(&config.remote)?;
    validate_pacing_config(&config.pacing)?;
    validate_output_config(&config.output)?;

    // Compiling the extractor checks every selector in the table
    PageExtractor::new(&config.selectors)?;

    Ok(())
}

/// Validates remote catalog configuration
fn validate_remote_config(config: &RemoteConfig) -> Result<(), ConfigError> {
    if config.domain.trim().is_empty() {
        return Err(ConfigError::Validation("domain cannot be empty".to_string()));
    }

    if config.domain.contains('/') {
        return Err(ConfigError::Validation(format!(
            "domain must be a bare host, got '{}'",
            config.domain
        )));
    }

    if config.scheme != "https" && config.scheme != "http" {
        return Err(ConfigError::Validation(format!(
            "scheme must be http or https, got '{}'",
            config.scheme
        )));
    }

    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    Ok(())
}

/// Validates pacing configuration
fn validate_pacing_config(config: &PacingConfig) -> Result<(), ConfigError> {
    // An hour between requests is certainly a typo
    if config.base_delay_ms.saturating_add(config.jitter_ms) > 3_600_000 {
        return Err(ConfigError::Validation(format!(
            "base_delay_ms + jitter_ms must not exceed one hour, got {}ms",
            config.base_delay_ms.saturating_add(config.jitter_ms)
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
