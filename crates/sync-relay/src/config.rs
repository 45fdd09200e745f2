//! TOML-based configuration for the relay server.
//!
//! Reads and writes [`AppConfig`] at the platform-appropriate config file:
//! - Windows:  `%APPDATA%\MediaSync\config.toml`
//! - Linux:    `~/.config/mediasync/config.toml`
//! - macOS:    `~/Library/Application Support/MediaSync/config.toml`
//!
//! On first run the default configuration is written to that path, giving the
//! operator a file to edit.  Fields annotated with `#[serde(default =
//! "some_fn")]` use the return value of `some_fn()` when absent from the TOML
//! file, so an older file missing newer fields still loads.  Example file:
//!
//! ```toml
//! [relay]
//! log_level = "debug"
//! max_line_bytes = 256
//!
//! [network]
//! listen_port = 7788
//! bind_address = "0.0.0.0"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The configured bind address and port do not form a valid socket address.
    #[error("invalid listen address {value:?}: {source}")]
    InvalidListenAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level relay configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// General relay behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayConfig {
    /// Schema version string – bump when breaking changes are introduced.
    #[serde(default = "default_version")]
    pub version: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Maximum length of one event line in bytes; longer lines are dropped.
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

/// Network port and bind-address settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// TCP port the relay listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,
    /// IP address to bind to.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_version() -> String {
    "1.0".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_max_line_bytes() -> usize {
    256
}
fn default_listen_port() -> u16 {
    7788
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            relay: RelayConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            log_level: default_log_level(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            listen_port: default_listen_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl AppConfig {
    /// Resolves the configured bind address and port into a socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidListenAddr`] when `bind_address` is not
    /// a valid IP address.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = format!("{}:{}", self.network.bind_address, self.network.listen_port);
        value
            .parse()
            .map_err(|source| ConfigError::InvalidListenAddr { value, source })
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    let dir = platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)?;
    Ok(dir.join("config.toml"))
}

/// Loads [`AppConfig`] from disk.  On first run (no file yet) the defaults
/// are written out and returned, so the operator has a file to edit.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let cfg = AppConfig::default();
            save_config_to(path, &cfg)?;
            Ok(cfg)
        }
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `config` to `path` as pretty TOML, creating parent directories.
fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MediaSync"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("mediasync"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("MediaSync")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_has_expected_network_settings() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.network.listen_port, 7788);
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_relay_config_default_caps_lines_at_256_bytes() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.max_line_bytes, 256);
    }

    #[test]
    fn test_relay_config_default_log_level_is_info() {
        let cfg = RelayConfig::default();
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_listen_addr_combines_bind_address_and_port() {
        let mut cfg = AppConfig::default();
        cfg.network.bind_address = "127.0.0.1".to_string();
        cfg.network.listen_port = 9000;

        let addr = cfg.listen_addr().expect("valid listen addr");
        assert_eq!(addr, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn test_listen_addr_rejects_invalid_bind_address() {
        let mut cfg = AppConfig::default();
        cfg.network.bind_address = "not-an-ip".to_string();

        assert!(matches!(
            cfg.listen_addr(),
            Err(ConfigError::InvalidListenAddr { .. })
        ));
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        let mut cfg = AppConfig::default();
        cfg.network.listen_port = 9000;
        cfg.relay.max_line_bytes = 128;

        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_network_overrides_defaults() {
        let toml_str = r#"
[network]
listen_port = 9999
"#;

        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        assert_eq!(cfg.network.listen_port, 9999);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
        assert_eq!(cfg.relay.max_line_bytes, 256);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        let result: Result<AppConfig, toml::de::Error> = toml::from_str("[[[ not valid toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_from_writes_defaults_on_first_run() {
        let dir =
            std::env::temp_dir().join(format!("mediasync-cfg-first-run-{}", std::process::id()));
        let path = dir.join("config.toml");
        std::fs::remove_dir_all(&dir).ok(); // stale state from an aborted run
        assert!(!path.exists());

        let cfg = load_config_from(&path).expect("first-run load");
        assert_eq!(cfg, AppConfig::default());
        assert!(path.exists(), "defaults must be persisted on first run");

        // The written file must load back to the same settings.
        let reloaded = load_config_from(&path).expect("reload");
        assert_eq!(reloaded, cfg);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_load_config_from_does_not_overwrite_existing_file() {
        let dir =
            std::env::temp_dir().join(format!("mediasync-cfg-existing-{}", std::process::id()));
        let path = dir.join("config.toml");
        std::fs::create_dir_all(&dir).expect("create dir");
        std::fs::write(&path, "[network]\nlisten_port = 9999\n").expect("seed file");

        let cfg = load_config_from(&path).expect("load existing");

        assert_eq!(cfg.network.listen_port, 9999);
        let on_disk = std::fs::read_to_string(&path).expect("read back");
        assert!(on_disk.contains("9999"), "operator's settings must survive");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("config.toml"),
                "config file must be named config.toml, got {path:?}"
            );
        }
        // NoPlatformConfigDir (e.g. in a stripped CI env) is also acceptable.
    }
}
