//! Ledger configuration
//!
//! A [`LedgerConfig`] is loaded from TOML or assembled with builder
//! methods. The store path is always explicit; nothing in the ledger reads
//! a global location.
//!
//! ```toml
//! path = "data/ledger.jsonl"
//! default_session = "session-1"
//! durability = "strict"
//! access_mode = "read_write"
//! log_level = "info"
//!
//! [sessions.session-1]
//! event_count = 3
//! initial_fusion_path = [0]
//!
//! [sessions.session-1.attestation]
//! required_keys = ["vitality"]
//! ranges = { vitality = { min = 0.0, max = 1.0 } }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use lineage_core::{Error, Result, SessionId};
use lineage_storage::{DurabilityMode, StoreOptions};
use serde::{Deserialize, Serialize};

/// Controls whether the ledger accepts appends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
    /// Queries and appends
    #[default]
    ReadWrite,
    /// Queries only; every mutation fails with [`Error::ReadOnly`]
    ReadOnly,
}

/// Inclusive numeric bounds for one attestation summary value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound
    pub min: f64,
    /// Upper bound
    pub max: f64,
}

impl ValueRange {
    /// Create a range.
    pub fn new(min: f64, max: f64) -> Self {
        ValueRange { min, max }
    }

    /// Whether `value` lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Declared shape of the attestations a session accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationShape {
    /// Summary keys every attestation must carry
    #[serde(default)]
    pub required_keys: Vec<String>,
    /// Bounds for summary values, by key
    #[serde(default)]
    pub ranges: BTreeMap<String, ValueRange>,
    /// Whether the digest must be non-empty
    #[serde(default = "default_true")]
    pub require_digest: bool,
}

fn default_true() -> bool {
    true
}

impl Default for AttestationShape {
    fn default() -> Self {
        AttestationShape {
            required_keys: Vec::new(),
            ranges: BTreeMap::new(),
            require_digest: true,
        }
    }
}

impl AttestationShape {
    /// Require a summary key.
    pub fn require_key(mut self, key: impl Into<String>) -> Self {
        self.required_keys.push(key.into());
        self
    }

    /// Bound a summary key.
    pub fn range(mut self, key: impl Into<String>, min: f64, max: f64) -> Self {
        self.ranges.insert(key.into(), ValueRange::new(min, max));
        self
    }
}

/// Per-session parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionProfile {
    /// Number of tracked events; generators run `B1 ..= B(event_count - 1)`
    pub event_count: usize,
    /// Fusion vector of the empty lineage
    #[serde(default)]
    pub initial_fusion_path: Vec<u8>,
    /// Attestation shape; operations must carry one when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationShape>,
}

impl SessionProfile {
    /// Profile with no attestation requirement.
    pub fn new(event_count: usize, initial_fusion_path: Vec<u8>) -> Self {
        SessionProfile {
            event_count,
            initial_fusion_path,
            attestation: None,
        }
    }

    /// Require attestations of the given shape.
    pub fn with_attestation(mut self, shape: AttestationShape) -> Self {
        self.attestation = Some(shape);
        self
    }
}

/// Complete ledger configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file
    pub path: PathBuf,
    /// Session used when a command omits `FOR`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_session: Option<String>,
    /// Append durability
    #[serde(default)]
    pub durability: DurabilityMode,
    /// Read-write or read-only
    #[serde(default)]
    pub access_mode: AccessMode,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Known sessions
    #[serde(default)]
    pub sessions: BTreeMap<String, SessionProfile>,
    /// Profile for sessions not listed in `sessions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<SessionProfile>,
}

impl LedgerConfig {
    /// Configuration for the ledger at `path` with defaults everywhere else.
    pub fn new(path: impl AsRef<Path>) -> Self {
        LedgerConfig {
            path: path.as_ref().to_path_buf(),
            default_session: None,
            durability: DurabilityMode::default(),
            access_mode: AccessMode::default(),
            log_level: None,
            sessions: BTreeMap::new(),
            default_profile: None,
        }
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: LedgerConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file. A relative ledger path is resolved against the
    /// directory containing the config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config {}: {}", path.display(), e))
        })?;
        let mut config: LedgerConfig = toml::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        if config.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.path = dir.join(&config.path);
            }
        }
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        let profiles = self
            .sessions
            .iter()
            .map(|(name, profile)| (name.as_str(), profile))
            .chain(self.default_profile.iter().map(|p| ("<default>", p)));
        for (name, profile) in profiles {
            if profile.event_count == 0 {
                return Err(Error::Config(format!(
                    "session '{}': event_count must be at least 1",
                    name
                )));
            }
            if let Some(shape) = &profile.attestation {
                for (key, range) in &shape.ranges {
                    if range.min.is_nan() || range.max.is_nan() || range.min > range.max {
                        return Err(Error::Config(format!(
                            "session '{}': range for '{}' is empty ({} > {})",
                            name, key, range.min, range.max
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the default session.
    pub fn default_session(mut self, session: impl Into<String>) -> Self {
        self.default_session = Some(session.into());
        self
    }

    /// Set durability mode.
    pub fn durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode;
        self
    }

    /// Set access mode.
    pub fn access_mode(mut self, mode: AccessMode) -> Self {
        self.access_mode = mode;
        self
    }

    /// Register a session profile.
    pub fn session(mut self, session: impl Into<String>, profile: SessionProfile) -> Self {
        self.sessions.insert(session.into(), profile);
        self
    }

    /// Profile applied to sessions not registered explicitly.
    pub fn default_profile(mut self, profile: SessionProfile) -> Self {
        self.default_profile = Some(profile);
        self
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Profile of a session.
    pub fn profile(&self, session: &SessionId) -> Result<&SessionProfile> {
        self.sessions
            .get(session.as_str())
            .or(self.default_profile.as_ref())
            .ok_or_else(|| Error::NotFound(format!("unknown session '{}'", session)))
    }

    /// The configured default session, if any.
    pub fn default_session_id(&self) -> Option<SessionId> {
        self.default_session.as_deref().map(SessionId::from)
    }

    /// Whether appends are refused.
    pub fn is_read_only(&self) -> bool {
        self.access_mode == AccessMode::ReadOnly
    }

    /// Store options derived from this configuration.
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::new()
            .durability(self.durability)
            .read_only(self.is_read_only())
    }
}
