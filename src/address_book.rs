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

use crate::{error::Error, utils, Result};
use ethcontract::Address;
use std::collections::HashMap;

pub const MASTERCOPY: &str = "gnosisSafe.mastercopy";
pub const CPK_FACTORY: &str = "gnosisSafe.cpkFactory";

/// Deployed contract addresses per network, keyed by logical name such as
/// `gnosisSafe.mastercopy`.
///
/// Names are stored lowercased since the config loader folds keys to
/// lowercase.
#[derive(Clone, Debug, Default)]
pub struct AddressBook {
  networks: HashMap<String, HashMap<String, Address>>,
}

impl AddressBook {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, network: &str, name: &str, address: Address) {
    self
      .networks
      .entry(network.to_lowercase())
      .or_default()
      .insert(name.to_lowercase(), address);
  }

  pub fn with(mut self, network: &str, name: &str, address: Address) -> Self {
    self.insert(network, name, address);
    self
  }

  /// Flattens the `{ "gnosisSafe": { "mastercopy": "0x.." } }` shape used in
  /// the network config files into dotted names.
  pub fn add_network(
    &mut self,
    network: &str,
    groups: &HashMap<String, HashMap<String, String>>,
  ) -> Result<()> {
    for (group, entries) in groups {
      for (name, address) in entries {
        let key = format!("{}.{}", group, name);
        let parsed = utils::parse_address(&key, address)
          .map_err(|e| Error::ConfigurationError(format!("{} on {}: {}", key, network, e)))?;
        self.insert(network, &key, parsed);
      }
    }
    Ok(())
  }

  pub fn get(&self, network: &str, name: &str) -> Option<Address> {
    self
      .networks
      .get(&network.to_lowercase())
      .and_then(|entries| entries.get(&name.to_lowercase()))
      .copied()
  }

  pub fn lookup(&self, network: &str, name: &str) -> Result<Address> {
    self.get(network, name).ok_or_else(|| {
      Error::ConfigurationError(format!(
        "no addressBook entry {} for network {}",
        name, network
      ))
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ethcontract::H160;

  #[test]
  fn lookup_is_scoped_to_network() {
    let book = AddressBook::new().with("rinkeby", CPK_FACTORY, H160::repeat_byte(1));
    assert_eq!(
      book.lookup("rinkeby", CPK_FACTORY).unwrap(),
      H160::repeat_byte(1)
    );
    assert!(matches!(
      book.lookup("mainnet", CPK_FACTORY),
      Err(Error::ConfigurationError(_))
    ));
    assert!(book.get("rinkeby", MASTERCOPY).is_none());
  }

  #[test]
  fn nested_config_entries_are_flattened() {
    let mut safe = HashMap::new();
    safe.insert(
      "mastercopy".to_string(),
      "0x34CfAC646f301356fAa8B21e94227e3583Fe3F5F".to_string(),
    );
    // keys arrive lowercased from the config loader
    safe.insert(
      "cpkfactory".to_string(),
      "0x0fB4340432e56c014fa96286de17222822a9281b".to_string(),
    );
    let mut groups = HashMap::new();
    groups.insert("gnosisSafe".to_string(), safe);

    let mut book = AddressBook::new();
    book.add_network("rinkeby", &groups).unwrap();
    assert!(book.get("rinkeby", MASTERCOPY).is_some());
    assert!(book.get("rinkeby", CPK_FACTORY).is_some());
  }

  #[test]
  fn bad_config_address_is_a_configuration_error() {
    let mut safe = HashMap::new();
    safe.insert("mastercopy".to_string(), "0xnope".to_string());
    let mut groups = HashMap::new();
    groups.insert("gnosisSafe".to_string(), safe);
    assert!(matches!(
      AddressBook::new().add_network("rinkeby", &groups),
      Err(Error::ConfigurationError(_))
    ));
  }
}
