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
  address_book::AddressBook,
  factory::{DeploymentResult, FactoryCall, FactoryInvoker, PendingDeployment},
  initializer,
  request::{DeploymentRequest, Mode, ResolvedRequest},
  signer::Signer,
  utils, Result,
};

/// Deploys a Gnosis Safe proxy through the CPK factory and runs its first
/// transaction in the same call.
pub struct SafeDeployer<'a, S: Signer + ?Sized> {
  book: &'a AddressBook,
  network: &'a str,
  signer: &'a S,
  explorer_url: Option<&'a str>,
}

impl<'a, S: Signer + ?Sized> SafeDeployer<'a, S> {
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

  /// Validates, fills defaults and encodes, without touching the chain
  /// beyond reading the signer address.
  pub async fn prepare(
    &self,
    request: DeploymentRequest,
  ) -> Result<(ResolvedRequest, FactoryCall)> {
    let resolved = request
      .validate()?
      .resolve(self.book, self.network, self.signer)
      .await?;

    let payload = match &resolved.mode {
      Mode::Setup => initializer::encode(&resolved.setup_fields())?,
      Mode::Initializer(payload) => utils::parse_hex("initializer", payload)?,
    };
    if resolved.log {
      match serde_json::to_string_pretty(&resolved) {
        Ok(json) => log::info!("resolved request:\n{}", json),
        Err(e) => log::warn!("couldnt render request: {}", e),
      }
    }
    let call = FactoryCall::new(&resolved, payload)?;
    Ok((resolved, call))
  }

  pub async fn submit(&self, request: DeploymentRequest) -> Result<PendingDeployment<'a, S>> {
    let (resolved, call) = self.prepare(request).await?;
    FactoryInvoker::new(self.book, self.network, self.signer)
      .explorer_url(self.explorer_url)
      .submit(&call, resolved.log)
      .await
  }

  /// Submits and waits for the transaction to be mined.
  pub async fn deploy(&self, request: DeploymentRequest) -> Result<DeploymentResult> {
    let log = request.log;
    let result = self.submit(request).await?.wait().await?;
    if log {
      log::info!("Done ✅");
    }
    Ok(result)
  }
}
