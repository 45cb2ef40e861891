use floodaware_common::config::FrontendConfig;

use super::loader::ConfigError;

/// Validate the complete front end configuration.
///
/// Collects every problem before failing. The server refuses to start on
/// validation failure.
pub fn validate(config: &FrontendConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_backend(config, &mut errors);
    validate_uploads(config, &mut errors);
    validate_pages(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.join("; ")))
    }
}

fn validate_backend(config: &FrontendConfig, errors: &mut Vec<String>) {
    let b = &config.backend;

    let url = b.base_url.trim();
    if url.is_empty() {
        errors.push("backend.base_url must not be empty".into());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push("backend.base_url must start with http:// or https://".into());
    }
    if b.request_timeout_seconds == 0 {
        errors.push("backend.request_timeout_seconds must be > 0".into());
    }
}

fn validate_uploads(config: &FrontendConfig, errors: &mut Vec<String>) {
    let u = &config.uploads;

    if u.max_image_bytes == 0 {
        errors.push("uploads.max_image_bytes must be > 0".into());
    }
    if u.request_body_limit_bytes == 0 {
        errors.push("uploads.request_body_limit_bytes must be > 0".into());
    }
}

fn validate_pages(config: &FrontendConfig, errors: &mut Vec<String>) {
    let p = &config.pages;

    if p.idle_ttl_seconds == 0 {
        errors.push("pages.idle_ttl_seconds must be > 0".into());
    }
    if p.max_sessions == 0 {
        errors.push("pages.max_sessions must be > 0".into());
    }
}
