use crate::config::types::{Config, CrawlerConfig, DownloadConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_download_config(&config.download)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth and max_pages are unsigned; 0 means unlimited

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if config.download_workers < 1 || config.download_workers > 64 {
        return Err(ConfigError::Validation(format!(
            "download_workers must be between 1 and 64, got {}",
            config.download_workers
        )));
    }

    if config.chunk_size < 512 || config.chunk_size > 4 * 1024 * 1024 {
        return Err(ConfigError::Validation(format!(
            "chunk_size must be between 512 bytes and 4 MiB, got {}",
            config.chunk_size
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates download configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.save_folder.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "save_folder cannot be empty".to_string(),
        ));
    }

    for extension in &config.extra_extensions {
        validate_extension(extension)?;
    }

    Ok(())
}

/// An extension is a dot followed by ASCII alphanumerics, e.g. ".tar"
fn validate_extension(extension: &str) -> Result<(), ConfigError> {
    let Some(rest) = extension.strip_prefix('.') else {
        return Err(ConfigError::Validation(format!(
            "Extension '{}' must start with '.'",
            extension
        )));
    };

    if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "Extension '{}' must be a dot followed by letters or digits",
            extension
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension(".iso").is_ok());
        assert!(validate_extension(".7z").is_ok());

        assert!(validate_extension("iso").is_err());
        assert!(validate_extension(".").is_err());
        assert!(validate_extension(".tar.gz").is_err());
        assert!(validate_extension("").is_err());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();
        config.crawler.download_workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.download_workers = 65;
        assert!(validate(&config).is_err());

        config.crawler.download_workers = 64;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.crawler.request_timeout_secs = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_crawler_name_rules() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "File Bot".to_string();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = String::new();
        assert!(validate(&config).is_err());

        config.user_agent.crawler_name = "file-bot".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_invalid_contact_url() {
        let mut config = Config::default();
        config.user_agent.contact_url = Some("not a url".to_string());
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }
}
