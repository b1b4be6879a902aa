use serde::Deserialize;

use crate::{
    cache::{Cache, IsCache},
    error::{Result, SimError},
    replace::lru::Lru,
};

/// Sizes of the simulated machine.
///
/// Register width is not configurable: registers are `u16`, so every write
/// is taken modulo 2^16.
#[derive(Debug, Clone)]
pub struct MachineConfig {
    pub num_regs: usize,
    pub mem_size: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            num_regs: 8,
            mem_size: 1 << 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    pub size: usize,
    pub assoc: usize,
    pub block_size: usize,
}

impl CacheConfig {
    pub fn num_lines(&self) -> Result<usize> {
        if self.size == 0 || self.assoc == 0 || self.block_size == 0 {
            return Err(SimError::Config(format!(
                "size, associativity and blocksize must be positive, got {},{},{}",
                self.size, self.assoc, self.block_size
            )));
        }
        let per_line = self.assoc.checked_mul(self.block_size).ok_or_else(|| {
            SimError::Config("associativity * blocksize overflows".to_string())
        })?;
        if self.size % per_line != 0 {
            return Err(SimError::Config(format!(
                "size {} is not a multiple of associativity * blocksize ({})",
                self.size, per_line
            )));
        }
        Ok(self.size / per_line)
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub caches: Vec<CacheConfig>,
}

impl Config {
    /// Parses the `--cache` argument: `size,assoc,blocksize` for L1 alone,
    /// or six values for L1 followed by L2.
    pub fn from_cache_arg(arg: &str) -> Result<Self> {
        let parts = arg
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .map_err(|_| SimError::Config(format!("not an integer: {p:?}")))
            })
            .collect::<Result<Vec<_>>>()?;
        if parts.len() != 3 && parts.len() != 6 {
            return Err(SimError::Config(format!(
                "expected 3 or 6 values, got {}",
                parts.len()
            )));
        }
        let caches = parts
            .chunks(3)
            .map(|c| CacheConfig {
                size: c[0],
                assoc: c[1],
                block_size: c[2],
            })
            .collect();
        Ok(Config { caches })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        if config.caches.is_empty() || config.caches.len() > 2 {
            return Err(SimError::Config(format!(
                "expected 1 or 2 caches, got {}",
                config.caches.len()
            )));
        }
        Ok(config)
    }

    pub fn to_caches(self) -> Result<Vec<Box<dyn IsCache>>> {
        self.caches
            .into_iter()
            .enumerate()
            .map(|(idx, cc)| {
                let name = format!("L{}", idx + 1);
                let n_lines = cc.num_lines()?;
                log::debug!("{name}: {cc:?}, {n_lines} lines");
                Ok(Box::new(Cache::<Lru>::new(name, cc, n_lines)) as Box<dyn IsCache>)
            })
            .collect()
    }
}
