use std::{iter, marker::PhantomData, ops::RangeInclusive};

use serde::Serialize;

use crate::{
    config::CacheConfig,
    replace::{AccessResult, Replace},
};

/// An address split against one cache's geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Addr {
    pub line: usize,
    pub tag: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CacheStats {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub miss_rate: f64,
}

/// One way of a set. `recency` 0 is the most recently used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub tag: Option<usize>,
    pub recency: u64,
}

impl CacheLine {
    pub fn fill(&mut self, tag: usize) {
        self.tag = Some(tag);
        self.recency = 0;
    }
}

#[derive(Debug, Clone)]
pub struct CacheSet {
    pub lines: Vec<CacheLine>,
}

impl CacheSet {
    pub fn new(n_ways: usize) -> Self {
        CacheSet {
            lines: vec![CacheLine::default(); n_ways],
        }
    }

    pub fn find(&self, tag: usize) -> Option<usize> {
        self.lines.iter().position(|l| l.tag == Some(tag))
    }

    /// Ways fill in order and are never invalidated, so the first vacant
    /// way is also the only candidate the scan can reach.
    pub fn vacant(&self) -> Option<usize> {
        self.lines.iter().position(|l| l.tag.is_none())
    }

    /// The stalest way. Ties go to the lowest index.
    pub fn lru_way(&self) -> usize {
        let mut victim = 0;
        for (way, line) in self.lines.iter().enumerate().skip(1) {
            if line.recency > self.lines[victim].recency {
                victim = way;
            }
        }
        victim
    }

    pub fn age(&mut self, ways: RangeInclusive<usize>) {
        for line in &mut self.lines[ways] {
            line.recency += 1;
        }
    }

    pub fn age_all(&mut self) {
        let last = self.lines.len() - 1;
        self.age(0..=last);
    }

    pub fn promote(&mut self, way: usize) {
        self.lines[way].recency = 0;
        self.age_all();
    }

    /// Replaces the stalest way with `tag` and returns its index.
    pub fn evict(&mut self, tag: usize) -> usize {
        let way = self.lru_way();
        log::trace!("evicting tag {:?} from way {way}", self.lines[way].tag);
        self.lines[way].fill(tag);
        self.age_all();
        way
    }
}

#[derive(Debug)]
pub struct Cache<R: Replace> {
    name: String,
    pub config: CacheConfig,
    pub sets: Vec<CacheSet>,
    pub n_lines: usize,
    repl: PhantomData<R>,
    hits: u64,
    misses: u64,
    writes: u64,
}

impl<R: Replace> Cache<R> {
    /// `n_lines` must come from `CacheConfig::num_lines`.
    pub fn new(name: String, config: CacheConfig, n_lines: usize) -> Self {
        Cache {
            name,
            config,
            sets: iter::repeat_with(|| CacheSet::new(config.assoc))
                .take(n_lines)
                .collect(),
            n_lines,
            repl: PhantomData,
            hits: 0,
            misses: 0,
            writes: 0,
        }
    }
}

pub trait IsCache {
    fn access(&mut self, addr: Addr) -> AccessResult;
    fn split_addr(&self, addr: usize) -> Addr;
    fn name(&self) -> &str;
    fn config(&self) -> CacheConfig;
    fn n_lines(&self) -> usize;
    fn hit(&mut self);
    fn miss(&mut self);
    fn write(&mut self);
    fn make_stats(&self) -> CacheStats;
}

impl<R: Replace> IsCache for Cache<R> {
    fn access(&mut self, addr: Addr) -> AccessResult {
        R::access(self, addr)
    }

    fn split_addr(&self, addr: usize) -> Addr {
        let block = addr / self.config.block_size;
        Addr {
            line: block % self.n_lines,
            tag: block / self.n_lines,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> CacheConfig {
        self.config
    }

    fn n_lines(&self) -> usize {
        self.n_lines
    }

    fn hit(&mut self) {
        self.hits += 1;
    }

    fn miss(&mut self) {
        self.misses += 1;
    }

    fn write(&mut self) {
        self.writes += 1;
    }

    fn make_stats(&self) -> CacheStats {
        let loads = self.hits + self.misses;
        let miss_rate = if loads == 0 {
            0.0
        } else {
            self.misses as f64 / loads as f64
        };
        CacheStats {
            name: self.name.clone(),
            hits: self.hits,
            misses: self.misses,
            writes: self.writes,
            miss_rate,
        }
    }
}
