use std::{fmt, str::FromStr};

use bitcoin::{
    PubkeyHash, ScriptBuf, ScriptHash, WitnessProgram, WitnessVersion, base58, bech32,
    hashes::Hash,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

use crate::types::ScriptKind;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid base58 address: {0}")]
    Base58(String),
    #[error("invalid bech32 address: {0}")]
    Bech32(String),
    #[error("address belongs to another network")]
    WrongNetwork,
    #[error("unsupported address version")]
    UnsupportedVersion,
    #[error("unsupported witness program")]
    UnsupportedWitnessProgram,
}

/// Address encoding parameters of a coin network.
///
/// Base58 versions above `0xff` are encoded as two-byte prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkParams {
    pub bech32_hrp: Option<String>,
    pub pub_key_hash: u32,
    pub script_hash: u32,
}

impl NetworkParams {
    pub fn bitcoin() -> Self {
        Self {
            bech32_hrp: Some("bc".to_string()),
            pub_key_hash: 0x00,
            script_hash: 0x05,
        }
    }

    pub fn testnet() -> Self {
        Self {
            bech32_hrp: Some("tb".to_string()),
            pub_key_hash: 0x6f,
            script_hash: 0xc4,
        }
    }

    pub fn regtest() -> Self {
        Self {
            bech32_hrp: Some("bcrt".to_string()),
            ..Self::testnet()
        }
    }

    pub fn litecoin() -> Self {
        Self {
            bech32_hrp: Some("ltc".to_string()),
            pub_key_hash: 0x30,
            script_hash: 0x32,
        }
    }

    pub fn dogecoin() -> Self {
        Self {
            bech32_hrp: None,
            pub_key_hash: 0x1e,
            script_hash: 0x16,
        }
    }

    pub fn zcash() -> Self {
        Self {
            bech32_hrp: None,
            pub_key_hash: 0x1cb8,
            script_hash: 0x1cbd,
        }
    }

    /// Decodes `address` into its scriptPubKey and script kind.
    pub fn address_to_script(&self, address: &str) -> Result<(ScriptBuf, ScriptKind), AddressError> {
        let script = match &self.bech32_hrp {
            Some(hrp) if has_hrp_prefix(address, hrp) => self.decode_segwit(address, hrp)?,
            _ => self.decode_base58(address)?,
        };
        let kind = script_kind(&script).ok_or(AddressError::UnsupportedWitnessProgram)?;
        Ok((script, kind))
    }

    fn decode_segwit(&self, address: &str, hrp: &str) -> Result<ScriptBuf, AddressError> {
        let (decoded_hrp, version, program) =
            bech32::segwit::decode(address).map_err(|e| AddressError::Bech32(e.to_string()))?;
        if decoded_hrp.to_lowercase() != hrp.to_lowercase() {
            return Err(AddressError::WrongNetwork);
        }
        let version = WitnessVersion::try_from(version.to_u8())
            .map_err(|_| AddressError::UnsupportedWitnessProgram)?;
        let program = WitnessProgram::new(version, program.as_slice())
            .map_err(|_| AddressError::UnsupportedWitnessProgram)?;
        Ok(ScriptBuf::new_witness_program(&program))
    }

    fn decode_base58(&self, address: &str) -> Result<ScriptBuf, AddressError> {
        let payload =
            base58::decode_check(address).map_err(|e| AddressError::Base58(e.to_string()))?;
        if let Some(hash) = strip_version(&payload, &version_bytes(self.pub_key_hash)?) {
            return Ok(ScriptBuf::new_p2pkh(&PubkeyHash::from_byte_array(hash)));
        }
        if let Some(hash) = strip_version(&payload, &version_bytes(self.script_hash)?) {
            return Ok(ScriptBuf::new_p2sh(&ScriptHash::from_byte_array(hash)));
        }
        Err(AddressError::UnsupportedVersion)
    }
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self::bitcoin()
    }
}

impl FromStr for NetworkParams {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" | "btc" | "mainnet" => Ok(Self::bitcoin()),
            "testnet" | "test" | "signet" => Ok(Self::testnet()),
            "regtest" => Ok(Self::regtest()),
            "litecoin" | "ltc" => Ok(Self::litecoin()),
            "dogecoin" | "doge" => Ok(Self::dogecoin()),
            "zcash" | "zec" => Ok(Self::zcash()),
            other => Err(format!("unknown network: {}", other)),
        }
    }
}

impl fmt::Display for NetworkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hrp={} p2pkh={:#x} p2sh={:#x}",
            self.bech32_hrp.as_deref().unwrap_or("-"),
            self.pub_key_hash,
            self.script_hash
        )
    }
}

/// Script kind of a standard scriptPubKey.
pub fn script_kind(script: &ScriptBuf) -> Option<ScriptKind> {
    if script.is_p2pkh() {
        Some(ScriptKind::P2pkh)
    } else if script.is_p2sh() {
        Some(ScriptKind::P2sh)
    } else if script.is_p2wpkh() {
        Some(ScriptKind::P2wpkh)
    } else if script.is_p2wsh() {
        Some(ScriptKind::P2wsh)
    } else if script.is_p2tr() {
        Some(ScriptKind::P2tr)
    } else {
        None
    }
}

fn has_hrp_prefix(address: &str, hrp: &str) -> bool {
    match (address.get(..hrp.len()), address.get(hrp.len()..hrp.len() + 1)) {
        (Some(prefix), Some("1")) => prefix.eq_ignore_ascii_case(hrp),
        _ => false,
    }
}

/// Base58 prefix of `version`: one byte, or two big-endian bytes above `0xff`.
fn version_bytes(version: u32) -> Result<Vec<u8>, AddressError> {
    if let Ok(byte) = u8::try_from(version) {
        return Ok(vec![byte]);
    }
    u16::try_from(version)
        .map(|v| v.to_be_bytes().to_vec())
        .map_err(|_| AddressError::UnsupportedVersion)
}

fn strip_version(payload: &[u8], prefix: &[u8]) -> Option<[u8; 20]> {
    let hash = payload.strip_prefix(prefix)?;
    hash.try_into().ok()
}
