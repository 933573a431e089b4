// src/config.rs

use crate::error::{ConfigError, ConfigResult};
use crate::service::CacheReadPolicy;
use ethers::types::Address;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_CACHE_COLLECTION: &str = "totalsupply_cache";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: String,
    pub token_address: Address,
    pub excluded_addresses: Vec<Address>,
    pub decimals: u8,
    pub cache_ttl_secs: u64,
    pub rpc_timeout_secs: u64,
    /// JSON document file backing the cache; in-memory when unset
    pub cache_file: Option<PathBuf>,
    pub cache_collection: String,
    pub cache_read_policy: CacheReadPolicy,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = required(&lookup, "RPC_URL")?;
        if !rpc_url.starts_with("http://") && !rpc_url.starts_with("https://") {
            return Err(invalid("RPC_URL", "Must start with http:// or https://"));
        }

        let token_address = parse_address("TOKEN_ADDRESS", &required(&lookup, "TOKEN_ADDRESS")?)?;

        let excluded_addresses = match lookup("EXCLUDED_ADDRESSES") {
            Some(list) => parse_address_list(&list)?,
            None => read_excluded_addresses()?,
        };

        let decimals = parse_or(&lookup, "TOKEN_DECIMALS", 18u8)?;
        // U256 tops out at 10^77
        if decimals > 77 {
            return Err(invalid("TOKEN_DECIMALS", "Must be between 0 and 77"));
        }

        let cache_ttl_secs = parse_or(&lookup, "CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)?;
        // freshness is compared in signed milliseconds
        if i64::try_from(cache_ttl_secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1000))
            .is_none()
        {
            return Err(invalid("CACHE_TTL_SECS", "Too large to express in milliseconds"));
        }
        let rpc_timeout_secs = parse_or(&lookup, "RPC_TIMEOUT_SECS", 5u64)?;
        if rpc_timeout_secs == 0 {
            return Err(invalid("RPC_TIMEOUT_SECS", "Must be greater than zero"));
        }

        let cache_file = lookup("CACHE_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);
        let cache_collection =
            lookup("CACHE_COLLECTION").unwrap_or_else(|| DEFAULT_CACHE_COLLECTION.to_string());

        let cache_read_policy = match lookup("CACHE_READ_POLICY") {
            Some(raw) => raw
                .parse()
                .map_err(|reason: String| invalid("CACHE_READ_POLICY", &reason))?,
            None => CacheReadPolicy::default(),
        };

        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        Ok(Config {
            rpc_url,
            token_address,
            excluded_addresses,
            decimals,
            cache_ttl_secs,
            rpc_timeout_secs,
            cache_file,
            cache_collection,
            cache_read_policy,
            bind_addr,
        })
    }

    pub fn cache_ttl_ms(&self) -> i64 {
        i64::try_from(self.cache_ttl_secs)
            .unwrap_or(i64::MAX)
            .saturating_mul(1000)
    }
}

/// The exclusion list shipped with the binary.
pub fn read_excluded_addresses() -> ConfigResult<Vec<Address>> {
    let content = include_str!("../config/excluded_addresses.json");
    serde_json::from_str(content)
        .map_err(|e| invalid("config/excluded_addresses.json", &e.to_string()))
}

fn parse_address_list(raw: &str) -> ConfigResult<Vec<Address>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_address("EXCLUDED_ADDRESSES", s))
        .collect()
}

fn parse_address(var: &str, raw: &str) -> ConfigResult<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|e| invalid(var, &format!("`{}` is not an address: {}", raw, e)))
}

fn required<F>(lookup: &F, var: &str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVar(var.to_string()))
}

fn parse_or<F, T>(lookup: &F, var: &str, default: T) -> ConfigResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| invalid(var, &format!("{} (got `{}`)", e, val))),
        None => Ok(default),
    }
}

fn invalid(var: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}
