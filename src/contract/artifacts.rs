//! Compiled-contract artifact identifiers and the artifact store boundary

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{ArtifactError, TrackerResult};

use super::graph::ContractGraph;

/// Identifier of one compiled contract artifact, formatted as
/// `<module>-<argsHash>-<unixTimeMillis>`.
///
/// Module names may themselves contain `-`, so parsing anchors on the two
/// rightmost separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArtifactId {
    module: String,
    args_hash: String,
    created_ms: u64,
}

impl ArtifactId {
    pub fn new(
        module: impl Into<String>,
        args_hash: impl Into<String>,
        created_ms: u64,
    ) -> Self {
        Self {
            module: module.into(),
            args_hash: args_hash.into(),
            created_ms,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn args_hash(&self) -> &str {
        &self.args_hash
    }

    /// Creation time in unix milliseconds
    pub fn created_ms(&self) -> u64 {
        self.created_ms
    }
}

impl Display for ArtifactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.module, self.args_hash, self.created_ms)
    }
}

impl FromStr for ArtifactId {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, time) = s
            .rsplit_once('-')
            .ok_or_else(|| ArtifactError::MalformedId(s.to_string()))?;
        let (module, args_hash) = rest
            .rsplit_once('-')
            .ok_or_else(|| ArtifactError::MalformedId(s.to_string()))?;
        if module.is_empty() || args_hash.is_empty() {
            return Err(ArtifactError::MalformedId(s.to_string()));
        }
        let created_ms: u64 = time
            .parse()
            .map_err(|_| ArtifactError::MalformedId(s.to_string()))?;
        Ok(Self::new(module, args_hash, created_ms))
    }
}

impl TryFrom<String> for ArtifactId {
    type Error = ArtifactError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ArtifactId> for String {
    fn from(id: ArtifactId) -> Self {
        id.to_string()
    }
}

/// Durable store of compiled contract artifacts.
///
/// An external collaborator: this crate holds no persisted state of its
/// own. `trash` is user-initiated, so its failure propagates to the
/// invoking action as an error value.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn list(&self) -> TrackerResult<Vec<ArtifactId>>;

    /// Move an artifact to the trash
    async fn trash(&self, id: &ArtifactId) -> TrackerResult<()>;

    /// Load the contract graph compiled into an artifact
    async fn open(&self, id: &ArtifactId) -> TrackerResult<ContractGraph>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let id = ArtifactId::new("vault", "9f8a", 1700000000123);
        let parsed: ArtifactId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.module(), "vault");
        assert_eq!(parsed.args_hash(), "9f8a");
        assert_eq!(parsed.created_ms(), 1700000000123);
    }

    #[test]
    fn test_hyphenated_module_names_survive() {
        let parsed: ArtifactId = "multi-sig-vault-9f8a-1700000000123".parse().unwrap();
        assert_eq!(parsed.module(), "multi-sig-vault");
        assert_eq!(parsed.args_hash(), "9f8a");
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert!("".parse::<ArtifactId>().is_err());
        assert!("vault".parse::<ArtifactId>().is_err());
        assert!("vault-9f8a".parse::<ArtifactId>().is_err());
        assert!("vault-9f8a-notatime".parse::<ArtifactId>().is_err());
        assert!("-9f8a-1700000000123".parse::<ArtifactId>().is_err());
    }

    #[test]
    fn test_serde_uses_string_form() {
        let id = ArtifactId::new("vault", "9f8a", 42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"vault-9f8a-42\"");
        let back: ArtifactId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
