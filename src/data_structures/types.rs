//! Primitive value types shared across the tracking model

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Marker prefix carried by synthesized placeholder ids.
///
/// The marker is a display and debugging aid only: whether an outpoint is
/// mock is decided by looking its transaction up in the contract graph,
/// never by inspecting the id string.
pub const MOCK_ID_PREFIX: &str = "mock:";

/// Transaction identifier.
///
/// Real ids are the hex ids assigned by the node once a transaction is
/// known on chain. Locally-authored transactions that have not been
/// broadcast carry a synthesized placeholder id of the form `mock:<n>`,
/// allocated by the contract graph that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Create an id from a node-assigned string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create the synthesized placeholder id for allocation sequence `seq`
    pub fn synthesized(seq: u64) -> Self {
        Self(format!("{MOCK_ID_PREFIX}{seq}"))
    }

    /// Whether the id carries the synthesized-placeholder marker
    pub fn has_mock_marker(&self) -> bool {
        self.0.starts_with(MOCK_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TxId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TxId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TxId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Amount in satoshis
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Satoshis(u64);

impl Satoshis {
    pub const ZERO: Satoshis = Satoshis(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for Satoshis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Satoshis {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Raw output script bytes.
///
/// Serialized as a hex string so oracle DTOs and artifact files stay
/// readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Script(#[serde(with = "hex_bytes")] Vec<u8>);

impl Script {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for Script {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Serde adapter encoding byte vectors as hex strings
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}
