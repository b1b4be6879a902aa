pub mod lru;

use crate::cache::{Addr, Cache};

pub trait Replace: Sized {
    fn access(cache: &mut Cache<Self>, addr: Addr) -> AccessResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
}
