use std::fmt;

use crate::cache::IsCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Hit,
    Miss,
    /// Stores are never classified; they are logged as `SW` at every level.
    Write,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Event::Hit => "HIT",
            Event::Miss => "MISS",
            Event::Write => "SW",
        })
    }
}

/// One cache level touched by one memory instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub cache: String,
    pub event: Event,
    pub pc: usize,
    pub addr: usize,
    pub line: usize,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = format!("{} {}", self.cache, self.event);
        write!(
            f,
            "{:<8} pc:{:>5}\taddr:{:>5}\tline:{:>4}",
            event, self.pc, self.addr, self.line
        )
    }
}

pub struct ConfigLine<'a>(pub &'a dyn IsCache);

impl fmt::Display for ConfigLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.0;
        let config = cache.config();
        write!(
            f,
            "Cache {} has size {}, associativity {}, blocksize {}, lines {}",
            cache.name(),
            config.size,
            config.assoc,
            config.block_size,
            cache.n_lines()
        )
    }
}
