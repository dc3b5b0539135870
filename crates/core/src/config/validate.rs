use super::{types::Config, ConfigError};

/// Validate configuration invariants that hold for every command.
///
/// Credential presence is checked separately by the `ensure_*` helpers
/// since each subcommand needs a different subset.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.generator.clip_duration_secs == 0 {
        return Err(ConfigError::ValidationError(
            "generator.clip_duration_secs cannot be 0".to_string(),
        ));
    }

    if config.generator.canvas_px == 0 {
        return Err(ConfigError::ValidationError(
            "generator.canvas_px cannot be 0".to_string(),
        ));
    }

    if config.publisher.poll_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "publisher.poll_interval_secs cannot be 0".to_string(),
        ));
    }

    if config.output.root.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "output.root cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// The Discogs token is required for the metadata/generate stage.
pub fn ensure_discogs(config: &Config) -> Result<(), ConfigError> {
    if config.discogs.token.is_empty() {
        return Err(ConfigError::MissingCredential(
            "discogs.token (DIGGER_DISCOGS__TOKEN)".to_string(),
        ));
    }
    Ok(())
}

/// Storage credentials are required for the publish stage.
pub fn ensure_storage(config: &Config) -> Result<(), ConfigError> {
    if config.storage.bucket.is_empty() {
        return Err(ConfigError::MissingCredential(
            "storage.bucket (DIGGER_STORAGE__BUCKET)".to_string(),
        ));
    }
    if config.storage.access_token.is_empty() {
        return Err(ConfigError::MissingCredential(
            "storage.access_token (DIGGER_STORAGE__ACCESS_TOKEN)".to_string(),
        ));
    }
    Ok(())
}

/// Instagram credentials are required for the publish stage.
pub fn ensure_instagram(config: &Config) -> Result<(), ConfigError> {
    if config.instagram.access_token.is_empty() {
        return Err(ConfigError::MissingCredential(
            "instagram.access_token (DIGGER_INSTAGRAM__ACCESS_TOKEN)".to_string(),
        ));
    }
    if config.instagram.business_account_id.is_empty() {
        return Err(ConfigError::MissingCredential(
            "instagram.business_account_id (DIGGER_INSTAGRAM__BUSINESS_ACCOUNT_ID)".to_string(),
        ));
    }
    Ok(())
}
