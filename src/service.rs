// src/service.rs

use crate::cache::SupplyCache;
use crate::error::{SupplyError, SupplyResult};
use crate::supply::SupplyCalculator;
use ethers::types::Address;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Source of the current time in Unix milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// What to do when the cache cannot be read before computing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CacheReadPolicy {
    /// Log and compute as if the entry were missing
    #[default]
    Degrade,
    /// Fail the request
    FailClosed,
}

impl FromStr for CacheReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degrade" => Ok(Self::Degrade),
            "fail-closed" | "fail_closed" | "fail" => Ok(Self::FailClosed),
            other => Err(format!("expected `degrade` or `fail-closed`, got `{}`", other)),
        }
    }
}

impl fmt::Display for CacheReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degrade => f.write_str("degrade"),
            Self::FailClosed => f.write_str("fail-closed"),
        }
    }
}

/// Serves the adjusted supply of one token. Concurrent requests that all see
/// a stale entry each recompute; the last write wins.
pub struct SupplyService {
    contract_key: String,
    exclusion_list: Vec<Address>,
    cache: SupplyCache,
    calculator: SupplyCalculator,
    clock: Box<dyn Clock>,
    read_policy: CacheReadPolicy,
}

impl SupplyService {
    pub fn new(
        contract_key: impl Into<String>,
        exclusion_list: Vec<Address>,
        cache: SupplyCache,
        calculator: SupplyCalculator,
        clock: Box<dyn Clock>,
        read_policy: CacheReadPolicy,
    ) -> Self {
        Self {
            contract_key: contract_key.into(),
            exclusion_list,
            cache,
            calculator,
            clock,
            read_policy,
        }
    }

    pub fn contract_key(&self) -> &str {
        &self.contract_key
    }

    /// Return the cached value while fresh, otherwise compute and store it.
    ///
    /// A failed computation leaves the cache untouched.
    pub async fn adjusted_supply(&self) -> SupplyResult<String> {
        let now = self.clock.now_ms();

        match self.cache.get(&self.contract_key).await {
            Ok(Some(entry)) if self.cache.is_fresh(&entry, now) => {
                debug!(
                    contract = %self.contract_key,
                    age_ms = now.saturating_sub(entry.timestamp_ms),
                    "serving cached adjusted supply"
                );
                return Ok(entry.adjusted_supply);
            }
            Ok(Some(entry)) => {
                debug!(
                    contract = %self.contract_key,
                    age_ms = now.saturating_sub(entry.timestamp_ms),
                    "cache entry stale"
                );
            }
            Ok(None) => {
                debug!(contract = %self.contract_key, "no cache entry");
            }
            Err(e) => match self.read_policy {
                CacheReadPolicy::Degrade => {
                    warn!(contract = %self.contract_key, error = %e, "cache read failed, recomputing");
                }
                CacheReadPolicy::FailClosed => return Err(SupplyError::Storage(e)),
            },
        }

        let supply = self
            .calculator
            .compute_adjusted_supply(&self.exclusion_list)
            .await?;

        let computed_at = self.clock.now_ms();
        self.cache
            .put(&self.contract_key, &supply, computed_at)
            .await?;

        info!(contract = %self.contract_key, %supply, "adjusted supply recomputed");
        Ok(supply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_policy_parsing() {
        assert_eq!("degrade".parse::<CacheReadPolicy>().unwrap(), CacheReadPolicy::Degrade);
        assert_eq!(" Fail-Closed ".parse::<CacheReadPolicy>().unwrap(), CacheReadPolicy::FailClosed);
        assert!("retry".parse::<CacheReadPolicy>().is_err());
        assert_eq!(CacheReadPolicy::FailClosed.to_string(), "fail-closed");
    }

    #[test]
    fn test_system_clock_is_unix_millis() {
        // 2020-09-13 in milliseconds
        assert!(SystemClock.now_ms() > 1_600_000_000_000);
    }
}
