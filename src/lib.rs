// src/lib.rs
#![allow(clippy::module_inception)]

use ethers::contract::abigen;

abigen!(ERC20, r#"[
    function totalSupply() external view returns (uint256)
    function balanceOf(address) external view returns (uint256)
]"#);

pub mod cache;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod supply;
pub mod utils;

pub use config::Config;
pub use error::{RpcError, StorageError, SupplyError};
pub use service::SupplyService;
