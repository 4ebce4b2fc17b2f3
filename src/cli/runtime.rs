use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::Config;

pub const PORT_ENV: &str = "KINSHIP_PORT";
pub const HOST_ENV: &str = "KINSHIP_HOST";
pub const DATA_FILE_ENV: &str = "KINSHIP_DATA_FILE";
pub const LOG_FORMAT_ENV: &str = "KINSHIP_LOG_FORMAT";

pub fn load_local_env_overrides() {
    let path = Path::new("config/local.env");
    if !path.exists() {
        return;
    }

    match stdfs::read_to_string(path) {
        Ok(contents) => {
            for (idx, raw_line) in contents.lines().enumerate() {
                let line = raw_line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let Some((key, value)) = line.split_once('=') else {
                    warn!(line = idx + 1, "invalid local.env entry; skipping");
                    continue;
                };
                let key = key.trim();
                if key.is_empty() || env::var(key).is_ok() {
                    continue;
                }
                env::set_var(key, unquote(value.trim()));
            }
            info!(path = %path.display(), "Loaded environment overrides from local.env");
        }
        Err(err) => {
            warn!(path = %path.display(), ?err, "failed to read local.env overrides");
        }
    }
}

pub fn init_logging(level: &str, debug: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));
    let fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so --output json stays parseable on stdout.
    if env::var(LOG_FORMAT_ENV).is_ok_and(|value| value.eq_ignore_ascii_case("json")) {
        registry.with(fmt.json()).init();
    } else {
        registry.with(fmt).init();
    }

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // Priority: ./config/config.yaml > ~/.config/kinship/config.yaml
            let local_config = PathBuf::from("config/config.yaml");
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("kinship");
                path.push("config.yaml");
                path
            }
        }
    };

    if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .await
            .context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        info!("Loaded configuration from: {}", config_path.display());
        Ok(LoadedConfig {
            config,
            path: config_path,
        })
    } else {
        warn!(
            "Config file not found, using defaults: {}",
            config_path.display()
        );
        Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        })
    }
}

pub fn apply_env_overrides(config: &mut Config) {
    apply_overrides_from(config, |key| env::var(key).ok());
}

fn apply_overrides_from<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(PORT_ENV) {
        match raw.trim().parse::<u16>() {
            Ok(port) => {
                config.server.port = port;
                info!(port, "Using port from {}", PORT_ENV);
            }
            Err(err) => warn!(?err, value = raw, "invalid {} value", PORT_ENV),
        }
    }

    if let Some(host) = lookup(HOST_ENV).filter(|value| !value.trim().is_empty()) {
        config.server.host = host.trim().to_string();
    }

    if let Some(path) = lookup(DATA_FILE_ENV).filter(|value| !value.trim().is_empty()) {
        info!(path = %path, "Using data file from {}", DATA_FILE_ENV);
        config.storage.data_file = Some(PathBuf::from(path.trim()));
    }
}

fn unquote(value: &str) -> String {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        let inner = &value[1..value.len() - 1];
        inner
            .replace("\\\"", "\"")
            .replace("\\n", "\n")
            .replace("\\t", "\t")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_replace_file_values() {
        let mut config = Config::default();
        apply_overrides_from(
            &mut config,
            lookup(&[(PORT_ENV, "8088"), (DATA_FILE_ENV, "/tmp/kinship.json")]),
        );

        assert_eq!(config.server.port, 8088);
        assert_eq!(
            config.storage.data_file.as_deref(),
            Some(Path::new("/tmp/kinship.json"))
        );
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn malformed_port_is_ignored() {
        let mut config = Config::default();
        apply_overrides_from(&mut config, lookup(&[(PORT_ENV, "eighty")]));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn quoted_values_are_unescaped() {
        assert_eq!(unquote("\"a \\\"b\\\"\""), "a \"b\"");
        assert_eq!(unquote("plain"), "plain");
    }

    #[tokio::test]
    async fn explicit_config_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kinship.yaml");
        std::fs::write(&path, "server:\n  port: 7001\nsearch:\n  default_limit: 5\n").unwrap();

        let loaded = load_config(Some(&path)).await.unwrap();

        assert_eq!(loaded.path, path);
        assert_eq!(loaded.config.server.port, 7001);
        assert_eq!(loaded.config.search.default_limit, 5);
    }

    #[tokio::test]
    async fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let loaded = load_config(Some(&path)).await.unwrap();

        assert_eq!(loaded.config.server.port, 5000);
    }
}
