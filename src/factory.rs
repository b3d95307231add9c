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

use crate::{
  address_book::{self, AddressBook},
  error::Error,
  initializer::param,
  request::{Operation, ResolvedRequest},
  signer::{Receipt, Signer, TransactionRequest},
  utils, Result,
};
use ethcontract::{
  web3::ethabi::{param_type::ParamType, Function, Token},
  Address, H256, U256,
};
use std::convert::TryFrom;

/// Submission ceiling for `createProxyAndExecTransaction`.
pub const FACTORY_GAS_LIMIT: u64 = 3_000_000;
pub const PROXY_CREATION_EVENT: &str = "ProxyCreation(address)";

/// Arguments of `CPKFactory.createProxyAndExecTransaction`.
#[derive(Clone, Debug, PartialEq)]
pub struct FactoryCall {
  pub mastercopy: Address,
  pub salt_nonce: U256,
  pub fallback_handler: Address,
  pub to: Address,
  pub value: U256,
  pub data: Vec<u8>,
  pub operation: Operation,
}

pub fn create_proxy_and_exec_function() -> Function {
  #[allow(deprecated)]
  Function {
    name: "createProxyAndExecTransaction".to_owned(),
    inputs: vec![
      param(ParamType::Address),
      param(ParamType::Uint(256)),
      param(ParamType::Address),
      param(ParamType::Address),
      param(ParamType::Uint(256)),
      param(ParamType::Bytes),
      param(ParamType::Uint(8)),
    ],
    outputs: vec![param(ParamType::Bool)],
    constant: None,
    state_mutability: Default::default(),
  }
}

impl FactoryCall {
  /// `payload` is what the proxy gets executed with: the caller supplied
  /// initializer or the freshly encoded setup call.
  pub fn new(request: &ResolvedRequest, payload: Vec<u8>) -> Result<Self> {
    Ok(Self {
      mastercopy: utils::parse_address("mastercopy", &request.mastercopy)?,
      salt_nonce: utils::parse_u256("salt_nonce", &request.salt_nonce)?,
      fallback_handler: utils::parse_address("fallback_handler", &request.fallback_handler)?,
      to: utils::parse_address("to", &request.to)?,
      value: utils::parse_u256("value", &request.value)?,
      data: payload,
      operation: Operation::try_from(request.operation)?,
    })
  }

  pub fn encode(&self) -> Result<Vec<u8>> {
    create_proxy_and_exec_function()
      .encode_input(&[
        Token::Address(self.mastercopy),
        Token::Uint(self.salt_nonce),
        Token::Address(self.fallback_handler),
        Token::Address(self.to),
        Token::Uint(self.value),
        Token::Bytes(self.data.clone()),
        Token::Uint((self.operation as u8).into()),
      ])
      .map_err(|e| Error::EncodingError(e.to_string()))
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentResult {
  pub tx_hash: H256,
  pub block_number: Option<u64>,
  pub gas_used: Option<U256>,
  /// address of the new proxy, if the factory emitted `ProxyCreation`
  pub proxy: Option<Address>,
}

/// Submits factory calls on behalf of one signer against one network.
pub struct FactoryInvoker<'a, S: Signer + ?Sized> {
  book: &'a AddressBook,
  network: &'a str,
  signer: &'a S,
  explorer_url: Option<&'a str>,
}

impl<'a, S: Signer + ?Sized> FactoryInvoker<'a, S> {
  pub fn new(book: &'a AddressBook, network: &'a str, signer: &'a S) -> Self {
    Self {
      book,
      network,
      signer,
      explorer_url: None,
    }
  }

  pub fn explorer_url(mut self, url: Option<&'a str>) -> Self {
    self.explorer_url = url;
    self
  }

  pub async fn submit(&self, call: &FactoryCall, log: bool) -> Result<PendingDeployment<'a, S>> {
    let factory = self.book.lookup(self.network, address_book::CPK_FACTORY)?;
    if log {
      log::info!("CPK Factory: {:?}", factory);
    }
    let tx = TransactionRequest {
      to: factory,
      value: U256::zero(),
      gas: FACTORY_GAS_LIMIT.into(),
      data: call.encode()?,
    };
    let tx_hash = self.signer.send_transaction(tx).await.map_err(|e| match e {
      Error::SubmissionError(_) => e,
      other => Error::SubmissionError(other.to_string()),
    })?;
    if log {
      log::info!("Creation Tx Hash: {:?}", tx_hash);
      if let Some(url) = self.explorer_url {
        log::info!("{}/tx/{:?}", url.trim_end_matches('/'), tx_hash);
      }
    }
    Ok(PendingDeployment {
      signer: self.signer,
      factory,
      tx_hash,
    })
  }
}

/// A factory transaction that has a hash but may not be mined yet. Dropping
/// the `wait` future abandons the wait, the transaction itself stays out
/// there.
pub struct PendingDeployment<'a, S: Signer + ?Sized> {
  signer: &'a S,
  factory: Address,
  tx_hash: H256,
}

impl<'a, S: Signer + ?Sized> PendingDeployment<'a, S> {
  pub fn tx_hash(&self) -> H256 {
    self.tx_hash
  }

  pub async fn wait(self) -> Result<DeploymentResult> {
    let receipt = self.signer.wait_for_receipt(self.tx_hash).await?;
    if !receipt.status {
      log::warn!("createProxyAndExecTransaction reverted: {:?}", self.tx_hash);
      return Err(Error::ExecutionRevertedError(utils::format_hash(&self.tx_hash)));
    }
    Ok(DeploymentResult {
      tx_hash: self.tx_hash,
      block_number: receipt.block_number,
      gas_used: receipt.gas_used,
      proxy: proxy_created(&receipt, self.factory),
    })
  }
}

/// Reads the proxy address out of the factory's `ProxyCreation` log.
pub fn proxy_created(receipt: &Receipt, factory: Address) -> Option<Address> {
  let topic = H256::from(utils::keccak256(PROXY_CREATION_EVENT.as_bytes()));
  receipt
    .logs
    .iter()
    .find(|l| l.address == factory && l.topics.first() == Some(&topic))
    .and_then(|l| {
      if l.data.len() >= 32 {
        Some(Address::from_slice(&l.data[12..32]))
      } else {
        None
      }
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::signer::ReceiptLog;
  use ethcontract::H160;

  #[test]
  fn factory_selector() {
    assert_eq!(
      create_proxy_and_exec_function().short_signature()[..],
      utils::keccak256(
        b"createProxyAndExecTransaction(address,uint256,address,address,uint256,bytes,uint8)"
      )[..4]
    );
  }

  #[test]
  fn proxy_address_from_creation_log() {
    let factory = H160::repeat_byte(0xfa);
    let proxy = H160::repeat_byte(0x5a);
    let mut data = vec![0u8; 12];
    data.extend_from_slice(proxy.as_bytes());
    let creation = ReceiptLog {
      address: factory,
      topics: vec![H256::from(utils::keccak256(PROXY_CREATION_EVENT.as_bytes()))],
      data,
    };
    let mut receipt = Receipt {
      status: true,
      logs: vec![creation.clone()],
      ..Default::default()
    };
    assert_eq!(proxy_created(&receipt, factory), Some(proxy));
    // same event from another contract does not count
    receipt.logs = vec![ReceiptLog {
      address: H160::repeat_byte(1),
      ..creation
    }];
    assert_eq!(proxy_created(&receipt, factory), None);
  }
}
