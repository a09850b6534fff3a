//! Best-effort script to address rendering.
//!
//! The tracking model prefers the oracle-supplied address when a view is
//! present; otherwise it decodes the locally-known script. A script with
//! no recognized address form renders as the `UNKNOWN` placeholder and
//! never blocks rendering of the rest of the entity.

use serde::{Deserialize, Serialize};

use crate::errors::ScriptError;

use super::types::Script;

/// Placeholder shown when a script has no known address form
pub const UNKNOWN_ADDRESS: &str = "UNKNOWN";

/// Network the address version bytes are taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet | Network::Regtest => 0x6f,
        }
    }

    fn p2sh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet | Network::Regtest => 0xc4,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Network::Regtest
    }
}

// Script layouts this library recognizes. Witness programs are left to the
// oracle's view; locally they fall through to the UNKNOWN placeholder.
const P2PKH_LEN: usize = 25;
const P2SH_LEN: usize = 23;

/// Decode an output script into a base58check address
pub fn address_from_script(script: &Script, network: Network) -> Result<String, ScriptError> {
    let bytes = script.as_bytes();
    if bytes.is_empty() {
        return Err(ScriptError::Truncated);
    }

    // P2PKH: OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG
    if bytes.len() == P2PKH_LEN
        && bytes[0] == 0x76
        && bytes[1] == 0xa9
        && bytes[2] == 0x14
        && bytes[23] == 0x88
        && bytes[24] == 0xac
    {
        return Ok(base58check(&bytes[3..23], network.p2pkh_version()));
    }

    // P2SH: OP_HASH160 <20 bytes> OP_EQUAL
    if bytes.len() == P2SH_LEN && bytes[0] == 0xa9 && bytes[1] == 0x14 && bytes[22] == 0x87 {
        return Ok(base58check(&bytes[2..22], network.p2sh_version()));
    }

    Err(ScriptError::UnknownForm)
}

/// Address for display: the oracle-provided address when present, else the
/// locally-decoded one, else the `UNKNOWN` placeholder
pub fn display_address(external: Option<&str>, script: &Script, network: Network) -> String {
    if let Some(address) = external {
        return address.to_string();
    }
    address_from_script(script, network).unwrap_or_else(|_| UNKNOWN_ADDRESS.to_string())
}

fn base58check(payload: &[u8], version: u8) -> String {
    bs58::encode(payload)
        .with_check_version(version)
        .into_string()
}
