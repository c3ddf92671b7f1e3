mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./memories.toml",
        "~/.config/memories/config.toml",
        "/etc/memories/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Longest accepted session lifetime: one hundred years.
pub const MAX_SESSION_TIMEOUT_HOURS: u64 = 24 * 365 * 100;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let bucket = config.storage.bucket.trim();
    if bucket.is_empty() {
        anyhow::bail!("storage.bucket cannot be empty");
    }
    if bucket.contains('/') || bucket.contains('\\') || bucket == "." || bucket == ".." {
        anyhow::bail!("storage.bucket must be a single path segment: {:?}", bucket);
    }

    if config.ingest.asset_timeout_secs == 0 {
        anyhow::bail!("ingest.asset_timeout_secs cannot be 0");
    }

    if config.auth.session_timeout_hours == 0 {
        anyhow::bail!("auth.session_timeout_hours cannot be 0");
    }
    if config.auth.session_timeout_hours > MAX_SESSION_TIMEOUT_HOURS {
        anyhow::bail!(
            "auth.session_timeout_hours cannot exceed {} (got {})",
            MAX_SESSION_TIMEOUT_HOURS,
            config.auth.session_timeout_hours
        );
    }

    if config.ingest.inter_asset_delay_ms > 10_000 {
        tracing::warn!(
            delay_ms = config.ingest.inter_asset_delay_ms,
            "Inter-asset delay is unusually long"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        validate_config(&config).unwrap();
        assert_eq!(config.storage.bucket, "images");
        assert_eq!(config.ingest.inter_asset_delay_ms, 100);
        assert_eq!(config.ingest.asset_timeout_secs, 30);
        assert!(!config.ingest.auto_repair);
        assert_eq!(config.auth.session_timeout_hours, 24);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[ingest]\nauto_repair = true\n\n[storage]\ndata_dir = \"/var/lib/memories\""
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.ingest.auto_repair);
        assert_eq!(config.ingest.inter_asset_delay_ms, 100);
        assert_eq!(
            config.storage.db_path(),
            Path::new("/var/lib/memories/memories.db")
        );
    }

    #[test]
    fn rejects_nested_bucket() {
        let mut config = Config::default();
        config.storage.bucket = "images/slider".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut config = Config::default();
        config.ingest.asset_timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn session_timeout_is_bounded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[auth]\nsession_timeout_hours = 5000000000000").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("session_timeout_hours"));

        let mut config = Config::default();
        config.auth.session_timeout_hours = MAX_SESSION_TIMEOUT_HOURS;
        validate_config(&config).unwrap();
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let result = load_config_or_default(Some(Path::new("/nonexistent/memories.toml")));
        assert!(result.is_err());
    }
}
