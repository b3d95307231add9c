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

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("provide EITHER an initializer payload OR --setup args")]
  ConflictingModeError,
  #[error("must provide an initializer payload or --setup args")]
  MissingModeError,
  #[error("configuration error: {0}")]
  ConfigurationError(String),
  #[error("encoding error: {0}")]
  EncodingError(String),
  #[error("transaction rejected before inclusion: {0}")]
  SubmissionError(String),
  #[error("transaction {0} was mined but reverted")]
  ExecutionRevertedError(String),
  #[error("web3 error: {0}")]
  Web3Error(#[from] ethcontract::web3::Error),
  #[error("execution error: {0}")]
  ExecutionError(#[from] ethcontract::errors::ExecutionError),
  #[error("config error: {0}")]
  ConfigError(#[from] config::ConfigError),
  #[error("error: {0}")]
  Other(String),
}

impl From<&str> for Error {
  fn from(err: &str) -> Self {
    Error::Other(err.to_string())
  }
}
impl From<String> for Error {
  fn from(err: String) -> Self {
    Error::Other(err)
  }
}
