//! Continuation registry: schema-described spending paths per outpoint.
//!
//! Continuations are produced by contract compilation and are never
//! inferred from chain data. The registry is an owned object with an
//! explicit lifecycle (created on contract load, cleared on unload) passed
//! by reference to the reconciliation engine and the UI layer; the engine
//! only ever reads it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One alternative spending path available from an output.
///
/// `path` is hierarchical and `/`-separated; the last segment is the
/// display name. `schema` describes the witness/argument shape the path
/// requires, in JSON-Schema form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continuation {
    path: String,
    schema: Value,
}

impl Continuation {
    pub fn new(path: impl Into<String>, schema: Value) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The last `/`-separated segment of the path
    pub fn display_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }
}

/// Additive, overwrite-only mapping from outpoint key to the spending
/// paths a contract exposes there
#[derive(Debug, Default)]
pub struct ContinuationRegistry {
    by_outpoint: RwLock<HashMap<String, HashMap<String, Continuation>>>,
}

impl ContinuationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite one continuation under an outpoint key.
    /// Multiple continuations may share a key.
    pub fn register(
        &self,
        outpoint_key: impl Into<String>,
        path: impl Into<String>,
        schema: Value,
    ) {
        let path = path.into();
        let continuation = Continuation::new(path.clone(), schema);
        self.by_outpoint
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(outpoint_key.into())
            .or_default()
            .insert(path, continuation);
    }

    /// Full set of continuations for an outpoint key. Absent is a valid,
    /// non-error result: a plain wallet UTXO has no continuations.
    pub fn lookup(&self, outpoint_key: &str) -> Option<HashMap<String, Continuation>> {
        self.by_outpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(outpoint_key)
            .cloned()
    }

    /// Continuation paths for an outpoint key, sorted for stable display
    pub fn paths(&self, outpoint_key: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .lookup(outpoint_key)
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.by_outpoint
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every registration. Only used when the owning contract is
    /// unloaded; there is no per-entry removal.
    pub fn clear(&self) {
        self.by_outpoint
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_then_lookup() {
        let registry = ContinuationRegistry::new();
        let schema = json!({"type": "object", "properties": {"amount": {"type": "number"}}});
        registry.register("abc123:0", "vault/withdraw", schema.clone());

        let found = registry.lookup("abc123:0").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found["vault/withdraw"].schema(), &schema);

        assert!(registry.lookup("zzz:9").is_none());
    }

    #[test]
    fn test_unrelated_keys_unaffected() {
        let registry = ContinuationRegistry::new();
        registry.register("abc123:0", "vault/withdraw", json!({}));
        registry.register("def456:1", "vault/recover", json!({}));

        assert_eq!(registry.lookup("abc123:0").unwrap().len(), 1);
        assert_eq!(registry.lookup("def456:1").unwrap().len(), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_multiple_paths_share_an_outpoint() {
        let registry = ContinuationRegistry::new();
        registry.register("abc123:0", "vault/withdraw", json!({}));
        registry.register("abc123:0", "vault/clawback", json!({}));
        registry.register("abc123:0", "vault/withdraw", json!({"overwritten": true}));

        let found = registry.lookup("abc123:0").unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(
            found["vault/withdraw"].schema(),
            &json!({"overwritten": true})
        );
        assert_eq!(
            registry.paths("abc123:0"),
            vec!["vault/clawback".to_string(), "vault/withdraw".to_string()]
        );
    }

    #[test]
    fn test_display_name_is_last_segment() {
        let continuation = Continuation::new("vault/steps/withdraw", json!({}));
        assert_eq!(continuation.display_name(), "withdraw");

        let flat = Continuation::new("finish", json!({}));
        assert_eq!(flat.display_name(), "finish");
    }

    #[test]
    fn test_clear_for_contract_unload() {
        let registry = ContinuationRegistry::new();
        registry.register("abc123:0", "vault/withdraw", json!({}));
        registry.clear();
        assert!(registry.lookup("abc123:0").is_none());
        assert!(registry.is_empty());
    }
}
