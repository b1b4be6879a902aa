use std::io::Write;

use crate::{
    cache::CacheStats,
    config::{Config, MachineConfig},
    engine::{Engine, Step},
    error::Result,
    hierarchy::CacheHierarchy,
    image::MachineImage,
};

pub struct Simulator {
    pub engine: Engine,
    pub caches: CacheHierarchy,
}

impl Simulator {
    pub fn new(machine: &MachineConfig, image: MachineImage, config: Config) -> Result<Self> {
        Ok(Simulator {
            engine: Engine::new(machine, image),
            caches: CacheHierarchy::new(config)?,
        })
    }

    /// Echoes the cache configuration, then runs until the program halts,
    /// writing one line per cache level touched by each load or store.
    /// Returns the number of executed instructions.
    pub fn run<W: Write>(&mut self, out: &mut W) -> Result<u64> {
        for line in self.caches.config_lines() {
            writeln!(out, "{line}")?;
        }

        loop {
            match self.engine.step()? {
                Step::Next => {}
                Step::Mem(access) => {
                    for entry in self.caches.access(access) {
                        writeln!(out, "{entry}")?;
                    }
                }
                Step::Halt => break,
            }
        }

        let executed = self.engine.cpu.instr_idx;
        log::info!("halted at pc {} after {executed} instructions", self.engine.cpu.pc);
        Ok(executed)
    }

    pub fn make_stats(&self) -> Vec<CacheStats> {
        self.caches.make_stats()
    }
}
