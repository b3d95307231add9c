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
  initializer::SetupFields,
  signer::Signer,
  utils, Result,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::TryFrom;

/// CPK global salt.
pub const DEFAULT_SALT_NONCE: &str =
  "0xcfe33a586323e7325be6aa6ecd8b4600d232a9037e83c8ece69413b777dabe65";
pub const DEFAULT_FALLBACK_HANDLER: &str = "0x40A930851BD2e590Bd5A5C981b436de25742E980";
pub const DEFAULT_THRESHOLD: u64 = 1;
pub const DEFAULT_OPERATION: u8 = Operation::DelegateCall as u8;
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
pub const ZERO_HASH: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Operation {
  Call = 0,
  DelegateCall = 1,
}

impl TryFrom<u8> for Operation {
  type Error = Error;

  fn try_from(value: u8) -> Result<Self> {
    match value {
      0 => Ok(Operation::Call),
      1 => Ok(Operation::DelegateCall),
      other => Err(Error::EncodingError(format!(
        "operation must be 0 (call) or 1 (delegate call), got {}",
        other
      ))),
    }
  }
}

/// Raw parameters for one `createProxyAndExecTransaction` deployment, as read
/// from config files and the environment.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DeploymentRequest {
  pub mastercopy: Option<String>,
  pub salt_nonce: Option<String>,
  pub initializer: Option<String>,
  pub setup: bool,
  #[serde(deserialize_with = "owners_list")]
  pub owners: Option<Vec<String>>,
  pub threshold: Option<u64>,
  pub to: Option<String>,
  pub value: Option<String>,
  pub data: Option<String>,
  pub operation: Option<u8>,
  pub fallback_handler: Option<String>,
  pub payment_token: Option<String>,
  pub payment: Option<String>,
  pub payment_receiver: Option<String>,
  pub log: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OwnersInput {
  List(Vec<String>),
  Csv(String),
}

// DEPLOY_OWNERS=0xabc..,0xdef.. comes in as a single string
fn owners_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
  D: Deserializer<'de>,
{
  let owners = match Option::<OwnersInput>::deserialize(deserializer)? {
    Some(OwnersInput::List(list)) => list,
    Some(OwnersInput::Csv(csv)) => csv
      .split(',')
      .map(|o| o.trim().to_string())
      .filter(|o| !o.is_empty())
      .collect(),
    None => vec![],
  };
  // an empty list means "not supplied" so setup mode falls back to the signer
  Ok(if owners.is_empty() { None } else { Some(owners) })
}

/// Where the proxy's initializer payload comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum Mode {
  Initializer(String),
  Setup,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedRequest {
  mode: Mode,
  request: DeploymentRequest,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedRequest {
  pub mastercopy: String,
  pub salt_nonce: String,
  #[serde(skip)]
  pub mode: Mode,
  pub initializer: Option<String>,
  pub owners: Vec<String>,
  pub threshold: u64,
  pub to: String,
  pub value: String,
  pub data: String,
  pub operation: u8,
  pub fallback_handler: String,
  pub payment_token: String,
  pub payment: String,
  pub payment_receiver: String,
  pub log: bool,
}

impl DeploymentRequest {
  pub fn with_setup(mut self) -> Self {
    self.setup = true;
    self
  }

  pub fn with_initializer(mut self, initializer: &str) -> Self {
    self.initializer = Some(initializer.to_string());
    self
  }

  /// Checks the input mode only: an initializer payload and `setup` are
  /// mutually exclusive and one of them is required.
  pub fn validate(self) -> Result<ValidatedRequest> {
    let initializer = self
      .initializer
      .as_ref()
      .map(|i| i.trim())
      .filter(|i| !i.is_empty())
      .map(|i| i.to_string());
    let mode = match (initializer, self.setup) {
      (Some(_), true) => return Err(Error::ConflictingModeError),
      (None, false) => return Err(Error::MissingModeError),
      (Some(payload), false) => Mode::Initializer(payload),
      (None, true) => Mode::Setup,
    };
    Ok(ValidatedRequest {
      mode,
      request: self,
    })
  }
}

impl ValidatedRequest {
  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  /// Fills every unset parameter. The mastercopy comes from the address book
  /// of `network`; in setup mode without owners the signer becomes the sole
  /// owner, which is the only time the signer is asked for its address.
  pub async fn resolve<S: Signer + ?Sized>(
    self,
    book: &AddressBook,
    network: &str,
    signer: &S,
  ) -> Result<ResolvedRequest> {
    let ValidatedRequest { mode, request } = self;

    let mastercopy = match request.mastercopy {
      Some(m) => m,
      None => utils::format_address(&book.lookup(network, address_book::MASTERCOPY)?),
    };

    let owners = match (&mode, request.owners.filter(|o| !o.is_empty())) {
      (Mode::Setup, None) => vec![utils::format_address(&signer.address().await?)],
      (_, owners) => owners.unwrap_or_default(),
    };

    let initializer = match &mode {
      Mode::Initializer(payload) => Some(payload.clone()),
      Mode::Setup => None,
    };

    Ok(ResolvedRequest {
      mastercopy,
      salt_nonce: request
        .salt_nonce
        .unwrap_or_else(|| DEFAULT_SALT_NONCE.to_string()),
      mode,
      initializer,
      owners,
      threshold: request.threshold.unwrap_or(DEFAULT_THRESHOLD),
      to: request.to.unwrap_or_else(|| ZERO_ADDRESS.to_string()),
      value: request.value.unwrap_or_else(|| "0".to_string()),
      data: request.data.unwrap_or_else(|| ZERO_HASH.to_string()),
      operation: request.operation.unwrap_or(DEFAULT_OPERATION),
      fallback_handler: request
        .fallback_handler
        .unwrap_or_else(|| DEFAULT_FALLBACK_HANDLER.to_string()),
      payment_token: request
        .payment_token
        .unwrap_or_else(|| ZERO_ADDRESS.to_string()),
      payment: request.payment.unwrap_or_else(|| "0".to_string()),
      payment_receiver: request
        .payment_receiver
        .unwrap_or_else(|| ZERO_ADDRESS.to_string()),
      log: request.log,
    })
  }
}

impl ResolvedRequest {
  pub fn setup_fields(&self) -> SetupFields {
    SetupFields {
      owners: self.owners.clone(),
      threshold: self.threshold,
      to: self.to.clone(),
      data: self.data.clone(),
      fallback_handler: self.fallback_handler.clone(),
      payment_token: self.payment_token.clone(),
      payment: self.payment.clone(),
      payment_receiver: self.payment_receiver.clone(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn neither_mode_is_missing() {
    assert!(matches!(
      DeploymentRequest::default().validate(),
      Err(Error::MissingModeError)
    ));
    // whitespace is not a payload
    assert!(matches!(
      DeploymentRequest::default().with_initializer("  ").validate(),
      Err(Error::MissingModeError)
    ));
  }

  #[test]
  fn both_modes_conflict() {
    let request = DeploymentRequest::default()
      .with_setup()
      .with_initializer("0xb63e800d");
    assert!(matches!(
      request.validate(),
      Err(Error::ConflictingModeError)
    ));
  }

  #[test]
  fn validation_ignores_field_contents() {
    let request = DeploymentRequest {
      threshold: Some(0),
      to: Some("not an address".to_string()),
      operation: Some(7),
      ..Default::default()
    }
    .with_setup();
    assert_eq!(request.validate().unwrap().mode(), &Mode::Setup);
  }

  #[test]
  fn operation_range() {
    assert_eq!(Operation::try_from(0).unwrap(), Operation::Call);
    assert_eq!(Operation::try_from(1).unwrap(), Operation::DelegateCall);
    assert!(matches!(
      Operation::try_from(2),
      Err(Error::EncodingError(_))
    ));
  }

  #[test]
  fn owners_accept_csv_or_list() {
    let csv: DeploymentRequest = serde_json::from_str(
      r#"{"setup": true, "owners": "0x01, 0x02,"}"#,
    )
    .unwrap();
    assert_eq!(
      csv.owners,
      Some(vec!["0x01".to_string(), "0x02".to_string()])
    );
    let list: DeploymentRequest =
      serde_json::from_str(r#"{"owners": ["0x03"]}"#).unwrap();
    assert_eq!(list.owners, Some(vec!["0x03".to_string()]));
    let none: DeploymentRequest = serde_json::from_str(r#"{"setup": true}"#).unwrap();
    assert_eq!(none.owners, None);
    // DEPLOY_OWNERS= or DEPLOY_OWNERS=, supplies nothing
    for blank in &[r#""""#, r#"",,""#, "[]"] {
      let request: DeploymentRequest =
        serde_json::from_str(&format!(r#"{{"setup": true, "owners": {}}}"#, blank)).unwrap();
      assert_eq!(request.owners, None);
    }
  }
}
