use std::str::FromStr;

use ethers::{
    signers::{LocalWallet, Signer},
    types::Address,
    utils::to_checksum,
};
use thiserror::Error;

use crate::ChainError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid private key length: {0} characters (should be 64, or 66 with 0x prefix)")]
    InvalidLength(usize),
    #[error("invalid private key: must contain only hexadecimal characters")]
    NonHex,
    #[error("failed to derive address from private key")]
    Derivation,
}

/// Strips an optional lower-case `0x` prefix and checks for exactly 64 hex characters.
pub fn normalize_private_key(raw: &str) -> Result<String, KeyError> {
    let body = raw.strip_prefix("0x").unwrap_or(raw);
    let len = body.chars().count();
    if len != 64 {
        return Err(KeyError::InvalidLength(len));
    }
    if !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(KeyError::NonHex);
    }
    Ok(body.to_ascii_lowercase())
}

/// Derives the account address for a secp256k1 private key. Pure: no I/O.
pub fn derive_address(private_key: &str) -> Result<Address, KeyError> {
    let key = normalize_private_key(private_key)?;
    let bytes = hex::decode(&key).map_err(|_| KeyError::NonHex)?;
    let wallet = LocalWallet::from_bytes(&bytes).map_err(|_| KeyError::Derivation)?;
    Ok(wallet.address())
}

pub fn checksum_address(address: &Address) -> String {
    to_checksum(address, None)
}

/// Accepts `0x` + 40 hex chars. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, ChainError> {
    let invalid = || ChainError::InvalidAddress(raw.to_string());
    let body = raw.strip_prefix("0x").ok_or_else(invalid)?;
    if body.len() != 40 || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let address = Address::from_str(body).map_err(|_| invalid())?;
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower && checksum_address(&address) != raw {
        return Err(invalid());
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    #[test]
    fn derivation_is_deterministic_with_or_without_prefix() {
        let plain = derive_address(KEY).expect("plain key");
        let prefixed = derive_address(&format!("0x{KEY}")).expect("prefixed key");
        let upper = derive_address(&KEY.to_uppercase()).expect("upper-case key");
        assert_eq!(plain, prefixed);
        assert_eq!(plain, upper);
        assert_eq!(checksum_address(&plain), ADDRESS);
        assert_eq!(derive_address(KEY).unwrap(), plain);
    }

    #[test]
    fn key_one_maps_to_known_address() {
        let key = format!("{:0>64}", "1");
        let address = derive_address(&key).expect("key 1");
        assert_eq!(
            checksum_address(&address),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(derive_address("abc"), Err(KeyError::InvalidLength(3)));
        assert_eq!(
            derive_address(&format!("0x{KEY}00")),
            Err(KeyError::InvalidLength(66))
        );
        assert_eq!(derive_address(""), Err(KeyError::InvalidLength(0)));
    }

    #[test]
    fn rejects_padding_and_upper_case_prefix() {
        assert_eq!(
            derive_address(&format!(" {KEY} ")),
            Err(KeyError::InvalidLength(66))
        );
        assert_eq!(
            derive_address(&format!("0X{KEY}")),
            Err(KeyError::InvalidLength(66))
        );
        assert_eq!(
            derive_address(&format!("0x{KEY}\n")),
            Err(KeyError::InvalidLength(65))
        );
    }

    #[test]
    fn rejects_non_hex() {
        let bad = format!("{}zz", &KEY[..62]);
        assert_eq!(derive_address(&bad), Err(KeyError::NonHex));
    }

    #[test]
    fn rejects_zero_key() {
        let zero = "0".repeat(64);
        assert_eq!(derive_address(&zero), Err(KeyError::Derivation));
    }

    #[test]
    fn parse_address_checks_format_and_checksum() {
        assert!(parse_address(ADDRESS).is_ok());
        assert!(parse_address(&ADDRESS.to_lowercase()).is_ok());
        assert!(parse_address("0x2c7536e3605d9c16a7a3d7b1898e529396a65c2").is_err());
        assert!(parse_address("2c7536E3605D9C16a7a3D7b1898e529396a65c23").is_err());
        let broken = ADDRESS.replacen('E', "e", 1);
        assert!(matches!(
            parse_address(&broken),
            Err(ChainError::InvalidAddress(_))
        ));
    }
}
