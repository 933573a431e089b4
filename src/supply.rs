// src/supply.rs
use crate::error::{RpcError, RpcResult};
use crate::{ERC20, utils};
use async_trait::async_trait;
use ethers::contract::ContractError;
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use futures::future::try_join_all;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Read-only view of the token contract.
#[async_trait]
pub trait SupplyReader: Send + Sync {
    async fn total_supply(&self) -> RpcResult<U256>;
    async fn balance_of(&self, owner: Address) -> RpcResult<U256>;
}

/// [`SupplyReader`] over the generated ERC-20 binding, with every call
/// bounded by `timeout`.
pub struct Erc20Reader<M> {
    contract: ERC20<M>,
    timeout: Duration,
}

impl<M: Middleware + 'static> Erc20Reader<M> {
    pub fn new(contract: ERC20<M>, timeout: Duration) -> Self {
        Self { contract, timeout }
    }

    async fn bounded<T, F>(&self, call: String, fut: F) -> RpcResult<T>
    where
        F: Future<Output = Result<T, ContractError<M>>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(RpcError::Call {
                call,
                message: e.to_string(),
            }),
            Err(_) => Err(RpcError::Timeout {
                call,
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> SupplyReader for Erc20Reader<M> {
    async fn total_supply(&self) -> RpcResult<U256> {
        let call = self.contract.total_supply();
        self.bounded("totalSupply()".to_string(), call.call()).await
    }

    async fn balance_of(&self, owner: Address) -> RpcResult<U256> {
        let call = self.contract.balance_of(owner);
        self.bounded(format!("balanceOf({:?})", owner), call.call()).await
    }
}

/// Computes `totalSupply - Σ balanceOf(excluded)` for one token.
pub struct SupplyCalculator {
    reader: Arc<dyn SupplyReader>,
    decimals: u8,
}

impl SupplyCalculator {
    pub fn new(reader: Arc<dyn SupplyReader>, decimals: u8) -> Self {
        Self { reader, decimals }
    }

    /// Query the chain and return the adjusted supply in display units.
    ///
    /// Balance reads are issued concurrently; any single failure fails the
    /// whole computation.
    pub async fn compute_adjusted_supply(&self, exclusion_list: &[Address]) -> RpcResult<String> {
        let total_supply = self.reader.total_supply().await?;
        let balances = try_join_all(
            exclusion_list
                .iter()
                .map(|owner| self.reader.balance_of(*owner)),
        )
        .await?;

        let value = adjusted_supply(total_supply, &balances);
        let human = value.to_human(self.decimals);
        debug!(%total_supply, excluded = balances.len(), value = %human, "computed adjusted supply");
        Ok(human)
    }
}

/// Signed base-unit amount. `negative` is never set on a zero magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyAmount {
    pub magnitude: U256,
    pub negative: bool,
}

impl SupplyAmount {
    pub fn positive(magnitude: U256) -> Self {
        Self {
            magnitude,
            negative: false,
        }
    }

    pub fn negative(magnitude: U256) -> Self {
        Self {
            magnitude,
            negative: !magnitude.is_zero(),
        }
    }

    pub fn to_human(&self, decimals: u8) -> String {
        let unsigned = utils::u256_to_human(self.magnitude, decimals);
        if self.negative {
            format!("-{}", unsigned)
        } else {
            unsigned
        }
    }
}

/// `total_supply - Σ excluded_balances` in base units.
///
/// The difference goes negative when the excluded balances exceed the total
/// supply. The sum saturates at `U256::MAX`. Both cases are logged.
pub fn adjusted_supply(total_supply: U256, excluded_balances: &[U256]) -> SupplyAmount {
    let mut excluded = U256::zero();
    for balance in excluded_balances {
        excluded = match excluded.checked_add(*balance) {
            Some(sum) => sum,
            None => {
                warn!("excluded balance sum overflowed U256, saturating");
                U256::MAX
            }
        };
    }

    match total_supply.checked_sub(excluded) {
        Some(value) => SupplyAmount::positive(value),
        None => {
            warn!(%total_supply, %excluded, "excluded balances exceed total supply");
            SupplyAmount::negative(excluded - total_supply)
        }
    }
}
