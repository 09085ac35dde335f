//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use rebase_bridge::PeerConfig;
use rebase_types::{ChainId, LedgerParams, Rate, TokenAddress};
use rebase_utils::LogFormat;

use crate::NodeError;

/// Configuration for one chain's ledger deployment.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Chain this node's ledger lives on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u32,

    /// The paired chain the bridge adapter sends to and accepts from.
    #[serde(default = "default_remote_chain_id")]
    pub remote_chain_id: u32,

    /// Token contract on the remote chain, hex encoded (optional `0x`).
    #[serde(default = "default_dest_token_address")]
    pub dest_token_address: String,

    /// Global rate at creation, in units of 1e-18 per second.
    #[serde(default = "default_initial_global_rate")]
    pub initial_global_rate: u64,

    /// How long the relay waits before delivering each frame.
    #[serde(default = "default_finality_delay_ms")]
    pub finality_delay_ms: u64,

    /// Where `save_snapshot` writes and `restore` reads, if anywhere.
    #[serde(default)]
    pub snapshot_path: Option<PathBuf>,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_chain_id() -> u32 {
    1
}

fn default_remote_chain_id() -> u32 {
    2
}

fn default_dest_token_address() -> String {
    format!("0x{}", "00".repeat(32))
}

fn default_initial_global_rate() -> u64 {
    Rate::DEFAULT_GLOBAL.raw() as u64
}

fn default_finality_delay_ms() -> u64 {
    0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// The same configuration seen from the other chain.
    pub fn mirrored(&self, dest_token_address: impl Into<String>) -> Self {
        Self {
            chain_id: self.remote_chain_id,
            remote_chain_id: self.chain_id,
            dest_token_address: dest_token_address.into(),
            snapshot_path: None,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if !ChainId::new(self.chain_id).is_valid() || !ChainId::new(self.remote_chain_id).is_valid()
        {
            return Err(NodeError::Config("chain ids must be non-zero".into()));
        }
        if self.chain_id == self.remote_chain_id {
            return Err(NodeError::Config(
                "remote_chain_id must differ from chain_id".into(),
            ));
        }
        self.token_address()?;
        Ok(())
    }

    pub fn ledger_params(&self) -> LedgerParams {
        LedgerParams::new(ChainId::new(self.chain_id))
            .with_rate(Rate::new(u128::from(self.initial_global_rate)))
    }

    pub fn token_address(&self) -> Result<TokenAddress, NodeError> {
        TokenAddress::from_hex(&self.dest_token_address)
            .map_err(|e| NodeError::Config(format!("dest_token_address: {e}")))
    }

    pub fn peer_config(&self) -> Result<PeerConfig, NodeError> {
        Ok(PeerConfig::new(
            ChainId::new(self.remote_chain_id),
            self.token_address()?,
        ))
    }

    pub fn finality_delay(&self) -> Duration {
        Duration::from_millis(self.finality_delay_ms)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            remote_chain_id: default_remote_chain_id(),
            dest_token_address: default_dest_token_address(),
            initial_global_rate: default_initial_global_rate(),
            finality_delay_ms: default_finality_delay_ms(),
            snapshot_path: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
