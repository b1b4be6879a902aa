use crate::{
    cache::{CacheStats, IsCache},
    config::Config,
    engine::{MemAccess, MemKind},
    error::Result,
    replace::AccessResult,
    trace::{ConfigLine, Event, LogEntry},
};

/// L1 and an optional L2.
///
/// Loads walk down the levels until one hits. Stores allocate in every level
/// and are always forwarded, so they touch each cache exactly once.
pub struct CacheHierarchy {
    caches: Vec<Box<dyn IsCache>>,
}

impl CacheHierarchy {
    pub fn new(config: Config) -> Result<Self> {
        Ok(CacheHierarchy {
            caches: config.to_caches()?,
        })
    }

    pub fn config_lines(&self) -> impl Iterator<Item = ConfigLine<'_>> {
        self.caches.iter().map(|c| ConfigLine(c.as_ref()))
    }

    pub fn access(&mut self, access: MemAccess) -> Vec<LogEntry> {
        let mut entries = Vec::with_capacity(self.caches.len());
        for cache in self.caches.iter_mut() {
            let split = cache.split_addr(access.addr);
            let result = cache.access(split);
            let event = match (access.kind, result) {
                (MemKind::Store, _) => {
                    cache.write();
                    Event::Write
                }
                (MemKind::Load, AccessResult::Hit) => {
                    cache.hit();
                    Event::Hit
                }
                (MemKind::Load, AccessResult::Miss) => {
                    cache.miss();
                    Event::Miss
                }
            };
            entries.push(LogEntry {
                cache: cache.name().to_string(),
                event,
                pc: access.pc,
                addr: access.addr,
                line: split.line,
            });
            if event == Event::Hit {
                break;
            }
        }
        entries
    }

    pub fn make_stats(&self) -> Vec<CacheStats> {
        self.caches.iter().map(|c| c.make_stats()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hierarchy(arg: &str) -> CacheHierarchy {
        CacheHierarchy::new(Config::from_cache_arg(arg).unwrap()).unwrap()
    }

    fn load(addr: usize) -> MemAccess {
        MemAccess {
            pc: 0,
            addr,
            kind: MemKind::Load,
        }
    }

    fn store(addr: usize) -> MemAccess {
        MemAccess {
            pc: 0,
            addr,
            kind: MemKind::Store,
        }
    }

    fn events(entries: &[LogEntry]) -> Vec<(&str, Event)> {
        entries
            .iter()
            .map(|e| (e.cache.as_str(), e.event))
            .collect()
    }

    #[test]
    fn l1_hit_skips_l2() {
        let mut h = hierarchy("4,1,1,16,2,2");
        assert_eq!(
            events(&h.access(load(5))),
            vec![("L1", Event::Miss), ("L2", Event::Miss)]
        );
        assert_eq!(events(&h.access(load(5))), vec![("L1", Event::Hit)]);
    }

    #[test]
    fn l1_miss_can_hit_l2() {
        let mut h = hierarchy("4,1,1,16,2,2");
        h.access(load(1));
        // evicts 1 from L1, L2 keeps both
        h.access(load(5));
        assert_eq!(
            events(&h.access(load(1))),
            vec![("L1", Event::Miss), ("L2", Event::Hit)]
        );
    }

    #[test]
    fn stores_reach_every_level() {
        let mut h = hierarchy("4,1,1,16,2,2");
        for _ in 0..2 {
            assert_eq!(
                events(&h.access(store(9))),
                vec![("L1", Event::Write), ("L2", Event::Write)]
            );
        }
        // the stores allocated the block
        assert_eq!(events(&h.access(load(9))), vec![("L1", Event::Hit)]);
    }

    #[test]
    fn each_level_uses_its_own_line() {
        // L1: 4 lines of 1 word, L2: 2 lines of 4-word blocks
        let mut h = hierarchy("4,1,1,16,2,4");
        let entries = h.access(load(6));
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[1].line, 1);
    }

    #[test]
    fn single_level() {
        let mut h = hierarchy("2,2,1");
        let seq: Vec<_> = [0, 1, 0, 2, 1]
            .into_iter()
            .flat_map(|a| h.access(load(a)))
            .map(|e| e.event)
            .collect();
        assert_eq!(
            seq,
            vec![Event::Miss, Event::Miss, Event::Hit, Event::Miss, Event::Miss]
        );
    }

    #[test]
    fn stats_follow_events() {
        let mut h = hierarchy("4,1,1,16,2,2");
        h.access(load(1));
        h.access(load(1));
        h.access(store(2));
        let stats = h.make_stats();
        assert_eq!((stats[0].hits, stats[0].misses, stats[0].writes), (1, 1, 1));
        assert_eq!((stats[1].hits, stats[1].misses, stats[1].writes), (0, 1, 1));
    }
}
