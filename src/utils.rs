// Copyright 2021-2022 Semantic Network Ltd.
// This file is part of cpkdeploy.

// cpkdeploy is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// cpkdeploy is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with cpkdeploy.  If not, see <http://www.gnu.org/licenses/>.

use crate::{error::Error, Result};
use ethcontract::{Address, H160, H256, U256};
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
  let mut output = [0u8; 32];
  let mut hasher = Keccak::v256();
  hasher.update(bytes);
  hasher.finalize(&mut output);
  output
}

pub fn parse_address(field: &str, value: &str) -> Result<Address> {
  H160::from_str(value.strip_prefix("0x").unwrap_or(value)).map_err(
    |e: rustc_hex::FromHexError| {
      Error::EncodingError(format!("{} is not an address ({:?}): {}", field, value, e))
    },
  )
}

pub fn parse_hex(field: &str, value: &str) -> Result<Vec<u8>> {
  hex::decode(value.strip_prefix("0x").unwrap_or(value))
    .map_err(|e| Error::EncodingError(format!("{} is not valid hex ({:?}): {}", field, value, e)))
}

/// Accepts `0x`-prefixed hex or a plain decimal string.
pub fn parse_u256(field: &str, value: &str) -> Result<U256> {
  let value = value.trim();
  if value.is_empty() || value == "0x" {
    return Err(Error::EncodingError(format!("{} is empty", field)));
  }
  let parsed = if let Some(digits) = value.strip_prefix("0x") {
    U256::from_str_radix(digits, 16).map_err(|e| e.to_string())
  } else {
    U256::from_dec_str(value).map_err(|e| e.to_string())
  };
  parsed.map_err(|e| {
    Error::EncodingError(format!("{} is not an integer ({:?}): {}", field, value, e))
  })
}

pub fn format_address(address: &Address) -> String {
  format!("{:?}", address)
}

pub fn format_hash(hash: &H256) -> String {
  format!("{:?}", hash)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_hex_and_decimal_integers() {
    assert_eq!(parse_u256("value", "0x10").unwrap(), U256::from(16));
    assert_eq!(parse_u256("value", "16").unwrap(), U256::from(16));
    assert!(matches!(
      parse_u256("value", "sixteen"),
      Err(Error::EncodingError(_))
    ));
    // from_dec_str("") would be zero
    assert!(matches!(parse_u256("salt_nonce", ""), Err(Error::EncodingError(_))));
    assert!(matches!(parse_u256("value", "0x"), Err(Error::EncodingError(_))));
  }

  #[test]
  fn address_formatting_is_full_width() {
    let a = parse_address("to", "0x40A930851BD2e590Bd5A5C981b436de25742E980").unwrap();
    assert_eq!(
      format_address(&a),
      "0x40a930851bd2e590bd5a5c981b436de25742e980"
    );
    assert!(parse_address("to", "0x1234").is_err());
  }

  #[test]
  fn keccak_of_empty_input() {
    assert_eq!(
      hex::encode(keccak256(&[])),
      "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
    );
  }
}
