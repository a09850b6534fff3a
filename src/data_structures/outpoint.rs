//! Outpoint identity: one specific output of one specific transaction

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

use super::types::TxId;

/// Reference to one output of one transaction.
///
/// Two outpoints are equal iff txid and vout are equal. An outpoint is
/// classified mock when its transaction resolves to a phantom record in
/// the owning contract graph (see `ContractGraph::is_mock`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: TxId,
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: impl Into<TxId>, vout: u32) -> Self {
        Self {
            txid: txid.into(),
            vout,
        }
    }

    /// Stable lookup key of the form `<txid>:<vout>`, used by the
    /// continuation registry and UI-facing lookup maps
    pub fn key(&self) -> String {
        format!("{}:{}", self.txid, self.vout)
    }
}

impl Display for OutPoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

/// Parse a `<txid>:<vout>` key back into an outpoint.
///
/// The vout is the segment after the LAST `:` so synthesized ids, which
/// contain a `:` themselves, survive the round trip.
pub fn parse_outpoint_key(key: &str) -> Result<OutPoint, ModelError> {
    let (txid, vout) = key
        .rsplit_once(':')
        .ok_or_else(|| ModelError::MalformedOutpointKey(key.to_string()))?;
    if txid.is_empty() {
        return Err(ModelError::MalformedOutpointKey(key.to_string()));
    }
    let vout: u32 = vout
        .parse()
        .map_err(|_| ModelError::MalformedOutpointKey(key.to_string()))?;
    Ok(OutPoint::new(txid, vout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let outpoint = OutPoint::new("abc123", 0);
        assert_eq!(outpoint.key(), "abc123:0");
        assert_eq!(outpoint.to_string(), "abc123:0");
    }

    #[test]
    fn test_equality_is_componentwise() {
        assert_eq!(OutPoint::new("abc123", 1), OutPoint::new("abc123", 1));
        assert_ne!(OutPoint::new("abc123", 1), OutPoint::new("abc123", 2));
        assert_ne!(OutPoint::new("abc123", 1), OutPoint::new("def456", 1));
    }

    #[test]
    fn test_parse_round_trip() {
        let outpoint = OutPoint::new("abc123", 7);
        assert_eq!(parse_outpoint_key(&outpoint.key()).unwrap(), outpoint);
    }

    #[test]
    fn test_parse_survives_synthesized_ids() {
        let outpoint = OutPoint::new(TxId::synthesized(3), 2);
        assert_eq!(outpoint.key(), "mock:3:2");
        assert_eq!(parse_outpoint_key("mock:3:2").unwrap(), outpoint);
    }

    #[test]
    fn test_parse_rejects_malformed_keys() {
        assert!(parse_outpoint_key("no-separator").is_err());
        assert!(parse_outpoint_key("abc123:notanumber").is_err());
        assert!(parse_outpoint_key(":0").is_err());
    }
}
