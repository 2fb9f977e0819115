//! Tool configuration with TOML file support.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use mindepth_store_lmdb::DEFAULT_MAP_SIZE;
use mindepth_tracer::TraceConfig;
use mindepth_types::NetworkId;
use mindepth_utils::LogFormat;

use crate::args::Cli;

/// Settings shared by every subcommand.
///
/// Loaded from the `--config` TOML file when given; flags and `MINDEPTH_*`
/// environment variables then override individual values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Which network's ledger to use.
    #[serde(default)]
    pub network: NetworkId,

    /// Base data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LMDB map size used when the ledger is opened for writing.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// JSON checkpoint file used by `import`.
    #[serde(default)]
    pub checkpoints: Option<PathBuf>,

    #[serde(default)]
    pub trace: TraceConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./mindepth_data")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            network: NetworkId::default(),
            data_dir: default_data_dir(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            map_size: default_map_size(),
            checkpoints: None,
            trace: TraceConfig::default(),
        }
    }
}

impl ToolConfig {
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        toml::from_str(contents).context("failed to parse configuration")
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// File settings (or defaults) with the global flags applied on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        if let Some(data_dir) = &cli.data_dir {
            config.data_dir = data_dir.clone();
        }
        if cli.testnet {
            config.network = NetworkId::Testnet;
        } else if cli.stagenet {
            config.network = NetworkId::Stagenet;
        }
        if let Some(level) = &cli.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = cli.log_format {
            config.log_format = format;
        }
        Ok(config)
    }

    /// Directory of the LMDB environment for the configured network.
    pub fn ledger_dir(&self) -> PathBuf {
        let mut dir = self.data_dir.clone();
        if let Some(sub) = self.network.data_subdir() {
            dir.push(sub);
        }
        dir.push("lmdb");
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mindepth_tracer::OwnerPolicy;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ToolConfig::from_toml_str("").unwrap();
        assert_eq!(config, ToolConfig::default());
        assert_eq!(config.ledger_dir(), PathBuf::from("./mindepth_data/lmdb"));
    }

    #[test]
    fn full_file() {
        let config = ToolConfig::from_toml_str(
            r#"
            network = "stagenet"
            data_dir = "/var/lib/mindepth"
            log_format = "json"
            log_level = "debug"
            checkpoints = "/etc/mindepth/checkpoints.json"

            [trace]
            include_coinbase = true
            owner_policy = "reject_ambiguous"
            max_depth = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.network, NetworkId::Stagenet);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.ledger_dir(),
            PathBuf::from("/var/lib/mindepth/stagenet/lmdb")
        );
        assert!(config.trace.include_coinbase);
        assert!(!config.trace.parallel);
        assert_eq!(config.trace.owner_policy, OwnerPolicy::RejectAmbiguous);
        assert_eq!(config.trace.max_depth, Some(500));
    }

    #[test]
    fn unknown_network_is_an_error() {
        assert!(ToolConfig::from_toml_str(r#"network = "regtest""#).is_err());
    }

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mindepth.toml");
        std::fs::write(&path, "data_dir = \"/from/file\"\nlog_level = \"warn\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "mindepth",
            "--config",
            path.to_str().unwrap(),
            "--testnet",
            "--log-level",
            "trace",
            "depth",
        ])
        .unwrap();
        let config = ToolConfig::resolve(&cli).unwrap();
        assert_eq!(config.log_level, "trace");
        assert_eq!(config.ledger_dir(), PathBuf::from("/from/file/testnet/lmdb"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from(["mindepth", "--config", "/no/such/file.toml", "depth"])
            .unwrap();
        assert!(ToolConfig::resolve(&cli).is_err());
    }
}
