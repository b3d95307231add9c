pub mod address_book;
pub mod config;
pub mod deployer;
pub mod error;
pub mod factory;
pub mod initializer;
pub mod request;
pub mod signer;
pub mod utils;

pub type Result<T> = std::result::Result<T, error::Error>;
