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

//! ABI encoding of the Gnosis Safe `setup` call used as proxy initializer.

use crate::{error::Error, utils, Result};
use ethcontract::{
  web3::ethabi::{param_type::ParamType, Function, Param, Token},
  Address, U256,
};

pub const SETUP_SIGNATURE: &str =
  "setup(address[],uint256,address,bytes,address,address,uint256,address)";

/// The eight `setup` arguments in call order, unparsed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetupFields {
  pub owners: Vec<String>,
  pub threshold: u64,
  pub to: String,
  pub data: String,
  pub fallback_handler: String,
  pub payment_token: String,
  pub payment: String,
  pub payment_receiver: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SetupCall {
  pub owners: Vec<Address>,
  pub threshold: U256,
  pub to: Address,
  pub data: Vec<u8>,
  pub fallback_handler: Address,
  pub payment_token: Address,
  pub payment: U256,
  pub payment_receiver: Address,
}

pub(crate) fn param(kind: ParamType) -> Param {
  Param {
    name: "".to_owned(),
    kind,
    internal_type: None,
  }
}

pub fn setup_function() -> Function {
  #[allow(deprecated)]
  Function {
    name: "setup".to_owned(),
    inputs: vec![
      param(ParamType::Array(Box::new(ParamType::Address))),
      param(ParamType::Uint(256)),
      param(ParamType::Address),
      param(ParamType::Bytes),
      param(ParamType::Address),
      param(ParamType::Address),
      param(ParamType::Uint(256)),
      param(ParamType::Address),
    ],
    outputs: vec![],
    constant: None,
    state_mutability: Default::default(),
  }
}

impl SetupCall {
  pub fn parse(fields: &SetupFields) -> Result<Self> {
    let owners = fields
      .owners
      .iter()
      .enumerate()
      .map(|(i, o)| utils::parse_address(&format!("owners[{}]", i), o))
      .collect::<Result<Vec<_>>>()?;
    Ok(Self {
      owners,
      threshold: fields.threshold.into(),
      to: utils::parse_address("to", &fields.to)?,
      data: utils::parse_hex("data", &fields.data)?,
      fallback_handler: utils::parse_address("fallback_handler", &fields.fallback_handler)?,
      payment_token: utils::parse_address("payment_token", &fields.payment_token)?,
      payment: utils::parse_u256("payment", &fields.payment)?,
      payment_receiver: utils::parse_address("payment_receiver", &fields.payment_receiver)?,
    })
  }

  /// Selector followed by the ABI encoded arguments.
  pub fn encode(&self) -> Result<Vec<u8>> {
    let tokens = vec![
      Token::Array(self.owners.iter().copied().map(Token::Address).collect()),
      Token::Uint(self.threshold),
      Token::Address(self.to),
      Token::Bytes(self.data.clone()),
      Token::Address(self.fallback_handler),
      Token::Address(self.payment_token),
      Token::Uint(self.payment),
      Token::Address(self.payment_receiver),
    ];
    setup_function()
      .encode_input(&tokens)
      .map_err(|e| Error::EncodingError(e.to_string()))
  }

  pub fn decode(payload: &[u8]) -> Result<Self> {
    let function = setup_function();
    if payload.len() < 4 || payload[..4] != function.short_signature() {
      return Err(Error::EncodingError(
        "payload does not start with the setup selector".to_string(),
      ));
    }
    let mut tokens = function
      .decode_input(&payload[4..])
      .map_err(|e| Error::EncodingError(e.to_string()))?
      .into_iter();
    let mut next = |what: &str| {
      tokens
        .next()
        .ok_or_else(|| Error::EncodingError(format!("missing {}", what)))
    };
    let owners = next("owners")?
      .into_array()
      .unwrap_or_default()
      .into_iter()
      .filter_map(Token::into_address)
      .collect();
    Ok(Self {
      owners,
      threshold: uint(next("threshold")?)?,
      to: address(next("to")?)?,
      data: next("data")?
        .into_bytes()
        .ok_or_else(|| Error::EncodingError("data is not bytes".to_string()))?,
      fallback_handler: address(next("fallback_handler")?)?,
      payment_token: address(next("payment_token")?)?,
      payment: uint(next("payment")?)?,
      payment_receiver: address(next("payment_receiver")?)?,
    })
  }
}

fn address(token: Token) -> Result<Address> {
  token
    .into_address()
    .ok_or_else(|| Error::EncodingError("expected an address".to_string()))
}

fn uint(token: Token) -> Result<U256> {
  token
    .into_uint()
    .ok_or_else(|| Error::EncodingError("expected a uint".to_string()))
}

/// Builds the initializer payload for the proxy from the setup fields.
pub fn encode(fields: &SetupFields) -> Result<Vec<u8>> {
  SetupCall::parse(fields)?.encode()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn selector_matches_signature() {
    assert_eq!(
      setup_function().short_signature()[..],
      utils::keccak256(SETUP_SIGNATURE.as_bytes())[..4]
    );
    // well known Gnosis Safe v1.1.1 setup selector
    assert_eq!(hex::encode(setup_function().short_signature()), "b63e800d");
  }

  #[test]
  fn malformed_owner_is_an_encoding_error() {
    let fields = SetupFields {
      owners: vec!["0xzz".to_string()],
      threshold: 1,
      to: crate::request::ZERO_ADDRESS.to_string(),
      data: "0x".to_string(),
      fallback_handler: crate::request::ZERO_ADDRESS.to_string(),
      payment_token: crate::request::ZERO_ADDRESS.to_string(),
      payment: "0".to_string(),
      payment_receiver: crate::request::ZERO_ADDRESS.to_string(),
    };
    match encode(&fields) {
      Err(Error::EncodingError(msg)) => assert!(msg.contains("owners[0]")),
      other => panic!("unexpected {:?}", other.map(|p| hex::encode(p))),
    }
  }

  #[test]
  fn decode_rejects_foreign_selector() {
    assert!(SetupCall::decode(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    assert!(SetupCall::decode(&[0xb6]).is_err());
  }
}
