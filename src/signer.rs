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
use async_trait::async_trait;
use ethcontract::{
  errors::ExecutionError,
  transaction::{
    confirm::{wait_for_confirmation, ConfirmParams},
    ResolveCondition, TransactionBuilder, TransactionResult,
  },
  transport::DynTransport,
  web3::types::{Bytes, TransactionReceipt, U64},
  Account, Address, Web3, H256, U256,
};

#[derive(Clone, Debug, PartialEq)]
pub struct TransactionRequest {
  pub to: Address,
  pub value: U256,
  pub gas: U256,
  pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReceiptLog {
  pub address: Address,
  pub topics: Vec<H256>,
  pub data: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Receipt {
  pub transaction_hash: H256,
  /// false when the transaction was mined but reverted; receipts without a
  /// status field (pre-Byzantium) count as success
  pub status: bool,
  pub block_number: Option<u64>,
  pub gas_used: Option<U256>,
  pub logs: Vec<ReceiptLog>,
}

impl From<TransactionReceipt> for Receipt {
  fn from(r: TransactionReceipt) -> Self {
    Self {
      transaction_hash: r.transaction_hash,
      status: succeeded(r.status),
      block_number: r.block_number.map(|b| b.as_u64()),
      gas_used: r.gas_used,
      logs: r
        .logs
        .into_iter()
        .map(|l| ReceiptLog {
          address: l.address,
          topics: l.topics,
          data: l.data.0,
        })
        .collect(),
    }
  }
}

/// The account that pays for and sends the factory transaction.
#[async_trait(?Send)]
pub trait Signer {
  async fn address(&self) -> Result<Address>;

  /// Broadcasts the transaction and returns its hash once the node accepted
  /// it. An error means nothing was included.
  async fn send_transaction(&self, tx: TransactionRequest) -> Result<H256>;

  /// Resolves once the transaction is mined. Never times out on its own.
  async fn wait_for_receipt(&self, tx_hash: H256) -> Result<Receipt>;
}

fn succeeded(status: Option<U64>) -> bool {
  status.map(|s| s.as_u64() == 1).unwrap_or(true)
}

/// Waits for inclusion only. `ConfirmParams::mined()` gives up after 25 blocks,
/// timeouts belong to the caller.
pub(crate) fn confirm_params() -> ConfirmParams {
  ConfirmParams::mined().block_timeout(None)
}

#[derive(Clone)]
pub struct Web3Signer {
  web3: Web3<DynTransport>,
  account: Account<DynTransport>,
}

impl Web3Signer {
  pub fn new(web3: &Web3<DynTransport>, account: Account<DynTransport>) -> Self {
    Self {
      web3: web3.clone(),
      account,
    }
  }
}

#[async_trait(?Send)]
impl Signer for Web3Signer {
  async fn address(&self) -> Result<Address> {
    Ok(self.account.address())
  }

  async fn send_transaction(&self, tx: TransactionRequest) -> Result<H256> {
    let nonce = self
      .web3
      .eth()
      .transaction_count(self.account.address(), None)
      .await
      .map_err(|e| Error::SubmissionError(format!("couldnt fetch account nonce: {}", e)))?;
    let sent = TransactionBuilder::new(self.web3.clone())
      .from(self.account.clone())
      .to(tx.to)
      .value(tx.value)
      .gas(tx.gas)
      .data(Bytes(tx.data))
      .nonce(nonce)
      .resolve(ResolveCondition::Pending)
      .send()
      .await
      .map_err(|e| Error::SubmissionError(e.to_string()))?;
    Ok(match sent {
      TransactionResult::Hash(h) => h,
      TransactionResult::Receipt(r) => r.transaction_hash,
    })
  }

  async fn wait_for_receipt(&self, tx_hash: H256) -> Result<Receipt> {
    match wait_for_confirmation(&self.web3, tx_hash, confirm_params()).await {
      Ok(receipt) => Ok(receipt.into()),
      Err(ExecutionError::Failed(receipt)) => Ok((*receipt).into()),
      Err(e) => Err(e.into()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn confirmation_wait_has_no_block_timeout() {
    let params = confirm_params();
    assert_eq!(params.block_timeout, None);
    assert_eq!(params.confirmations, 0);
  }

  #[test]
  fn receipt_status() {
    assert!(!succeeded(Some(U64::from(0))));
    assert!(succeeded(Some(U64::from(1))));
    assert!(succeeded(None));
  }
}
