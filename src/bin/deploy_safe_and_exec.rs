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

use cpkdeploy::{config, deployer::SafeDeployer, Result};
use dotenv::dotenv;

async fn run() -> Result<String> {
  let net = std::env::var("NETWORK").map_err(|_| "NETWORK REQUIRED")?;
  let (signer, conf) = config::init_web3(net.as_str(), true).await?;
  let book = conf.address_book(net.as_str())?;
  let request = config::load_request(net.as_str())?;

  let result = SafeDeployer::new(&book, net.as_str(), &signer)
    .explorer_url(conf.explorer_url.as_deref())
    .deploy(request)
    .await?;
  if let Some(proxy) = result.proxy {
    log::info!("proxy created at {:?}", proxy);
  }
  Ok(format!("{:?}", result.tx_hash))
}

#[tokio::main]
async fn main() {
  dotenv().ok();
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  match run().await {
    Ok(tx_hash) => println!("{}", tx_hash),
    Err(e) => {
      log::error!("{}", e);
      std::process::exit(1);
    }
  }
}
