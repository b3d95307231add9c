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

use crate::{address_book::AddressBook, request::DeploymentRequest, signer::Web3Signer, Result};
use ethcontract::{transport::DynTransport, Account, Http, PrivateKey, Web3};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, str::FromStr};

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Config {
  pub chain_id: u64,
  pub private_key: String,
  pub eth_url: String,
  pub explorer_url: Option<String>,
  /// `{ "gnosisSafe": { "mastercopy": "0x..", "cpkFactory": "0x.." } }`
  #[serde(default)]
  pub address_book: HashMap<String, HashMap<String, String>>,
}

impl Config {
  pub fn address_book(&self, network: &str) -> Result<AddressBook> {
    let mut book = AddressBook::new();
    book.add_network(network, &self.address_book)?;
    Ok(book)
  }
}

// utils for binaries
pub fn load_config(network: &str) -> Result<Config> {
  let fp = format!("config/config.{}.json", network);
  let mut settings = config::Config::default();
  settings.merge(config::File::with_name(fp.as_str()))?;
  settings.merge(config::Environment::with_prefix("CPK"))?;
  Ok(settings.try_into::<Config>()?)
}

/// Request parameters from `config/deploy.<network>.json` (optional) and
/// `DEPLOY_*` environment variables, the latter winning.
pub fn load_request(network: &str) -> Result<DeploymentRequest> {
  let fp = format!("config/deploy.{}.json", network);
  let mut settings = config::Config::default();
  settings.merge(config::File::with_name(fp.as_str()).required(false))?;
  settings.merge(config::Environment::with_prefix("DEPLOY"))?;
  Ok(settings.try_into::<DeploymentRequest>()?)
}

// utils for binaries
pub async fn init_web3(
  net: &str,
  check_balance: bool,
) -> Result<(Web3Signer, Config)> {
  let conf = load_config(net)?;
  log::debug!("chain {} via {}", conf.chain_id, conf.eth_url);
  let priv_key = PrivateKey::from_str(conf.private_key.as_str())
    .map_err(|e| format!("couldnt parse private key: {:?}", e))?;
  let web3 = Web3::new(DynTransport::new(Http::new(conf.eth_url.as_str())?));
  let my_account = Account::Offline(priv_key, Some(conf.chain_id));

  if check_balance {
    let my_address = my_account.address();
    log::info!("my address {:?}", my_address);
    let balance = web3.eth().balance(my_address, None).await?;
    if balance.is_zero() {
      log::warn!("no ETH balance in the provided privkey (for deployment gas fees)");
    }
  }
  let signer = Web3Signer::new(&web3, my_account);
  Ok((signer, conf))
}
