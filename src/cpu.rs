use crate::config::MachineConfig;

/// Architectural state of the E20 core: the program counter and the
/// register file.
#[derive(Debug)]
pub struct Cpu {
    pub pc: usize,
    pub instr_idx: u64,
    regs: Vec<u16>,
}

impl Cpu {
    pub fn new(machine: &MachineConfig) -> Self {
        Cpu {
            pc: 0,
            instr_idx: 0,
            regs: vec![0; machine.num_regs],
        }
    }

    pub fn reg(&self, idx: usize) -> u16 {
        self.regs[idx]
    }

    pub fn set_reg(&mut self, idx: usize, value: u16) {
        self.regs[idx] = value;
    }

    pub fn regs(&self) -> &[u16] {
        &self.regs
    }
}
