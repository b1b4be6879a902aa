use crate::{
    config::MachineConfig,
    cpu::Cpu,
    error::{Result, SimError},
    image::MachineImage,
    isa::{decode, AluOp, Instr},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemKind {
    Load,
    Store,
}

/// A memory reference made by the instruction at `pc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemAccess {
    pub pc: usize,
    pub addr: usize,
    pub kind: MemKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Next,
    Mem(MemAccess),
    Halt,
}

#[derive(Debug)]
pub struct Engine {
    pub cpu: Cpu,
    pub memory: MachineImage,
}

impl Engine {
    pub fn new(machine: &MachineConfig, memory: MachineImage) -> Self {
        Engine {
            cpu: Cpu::new(machine),
            memory,
        }
    }

    /// Executes the instruction at the current pc.
    pub fn step(&mut self) -> Result<Step> {
        let pc = self.cpu.pc;
        let word = self
            .memory
            .get(pc)
            .ok_or(SimError::PcOutOfRange(pc as i32))?;
        let instr = decode(word);
        log::trace!("pc {pc:5}: {word:016b} {instr:?}");

        let (next, step) = match instr {
            Instr::Alu {
                op,
                dst,
                src_a,
                src_b,
            } => {
                let a = self.cpu.reg(src_a);
                let b = self.cpu.reg(src_b);
                let value = match op {
                    AluOp::Add => a.wrapping_add(b),
                    AluOp::Sub => a.wrapping_sub(b),
                    AluOp::And => a & b,
                    AluOp::Or => a | b,
                    AluOp::Slt => (a < b) as u16,
                };
                self.cpu.set_reg(dst, value);
                (pc as i32 + 1, Step::Next)
            }
            Instr::Jr { src } => (self.cpu.reg(src) as i32, Step::Next),
            Instr::Nop => (pc as i32 + 1, Step::Next),
            Instr::Slti { dst, src, imm } => {
                let value = (self.cpu.reg(src) < imm as u16) as u16;
                self.cpu.set_reg(dst, value);
                (pc as i32 + 1, Step::Next)
            }
            Instr::Addi { dst, src, imm } => {
                let value = self.cpu.reg(src).wrapping_add(imm as u16);
                self.cpu.set_reg(dst, value);
                (pc as i32 + 1, Step::Next)
            }
            Instr::Lw { dst, base, imm } => {
                let addr = self.effective_addr(pc, base, imm)?;
                let value = self
                    .memory
                    .get(addr)
                    .ok_or(SimError::AddressOutOfRange {
                        pc,
                        addr: addr as i32,
                    })?;
                self.cpu.set_reg(dst, value);
                let access = MemAccess {
                    pc,
                    addr,
                    kind: MemKind::Load,
                };
                (pc as i32 + 1, Step::Mem(access))
            }
            Instr::Sw { src, base, imm } => {
                let addr = self.effective_addr(pc, base, imm)?;
                self.memory
                    .set(addr, self.cpu.reg(src))
                    .ok_or(SimError::AddressOutOfRange {
                        pc,
                        addr: addr as i32,
                    })?;
                let access = MemAccess {
                    pc,
                    addr,
                    kind: MemKind::Store,
                };
                (pc as i32 + 1, Step::Mem(access))
            }
            Instr::Jeq { reg_a, reg_b, imm } => {
                if self.cpu.reg(reg_a) == self.cpu.reg(reg_b) {
                    (pc as i32 + 1 + imm as i32, Step::Next)
                } else {
                    (pc as i32 + 1, Step::Next)
                }
            }
            Instr::J { target } => (target as i32, jump(pc, target)),
            Instr::Jal { target } => {
                self.cpu.set_reg(7, (pc + 1) as u16);
                (target as i32, jump(pc, target))
            }
        };

        self.cpu.instr_idx += 1;
        if step == Step::Halt {
            return Ok(Step::Halt);
        }
        if next < 0 || next as usize >= self.memory.len() {
            return Err(SimError::PcOutOfRange(next));
        }
        self.cpu.pc = next as usize;
        Ok(step)
    }

    /// `reg[base] + imm`, which must land inside memory.
    fn effective_addr(&self, pc: usize, base: usize, imm: i16) -> Result<usize> {
        let addr = self.cpu.reg(base) as i32 + imm as i32;
        if addr < 0 || addr as usize >= self.memory.len() {
            return Err(SimError::AddressOutOfRange { pc, addr });
        }
        Ok(addr as usize)
    }
}

/// A jump to itself is the halt idiom.
fn jump(pc: usize, target: usize) -> Step {
    if target == pc {
        Step::Halt
    } else {
        Step::Next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn engine(program: &[u16]) -> Engine {
        let machine = MachineConfig::default();
        let mut memory = MachineImage::new(machine.mem_size);
        for (addr, &word) in program.iter().enumerate() {
            memory.set(addr, word).unwrap();
        }
        Engine::new(&machine, memory)
    }

    fn alu(func: u16, src_a: u16, src_b: u16, dst: u16) -> u16 {
        (src_a << 10) | (src_b << 7) | (dst << 4) | func
    }

    fn addi(dst: u16, src: u16, imm: i16) -> u16 {
        (0b111 << 13) | (src << 10) | (dst << 7) | (imm as u16 & 0x7f)
    }

    #[rstest]
    #[case(0b0000, 0xfff0, 0x0020, 0x0010)]
    #[case(0b0001, 0x0001, 0x0002, 0xffff)]
    #[case(0b0010, 0b1100, 0b1010, 0b1000)]
    #[case(0b0011, 0b1100, 0b1010, 0b1110)]
    #[case(0b0100, 3, 4, 1)]
    #[case(0b0100, 4, 3, 0)]
    #[case(0b0100, 0xffff, 1, 0)]
    fn alu_ops(#[case] func: u16, #[case] a: u16, #[case] b: u16, #[case] expected: u16) {
        let mut e = engine(&[alu(func, 1, 2, 3)]);
        e.cpu.set_reg(1, a);
        e.cpu.set_reg(2, b);
        assert_eq!(e.step().unwrap(), Step::Next);
        assert_eq!(e.cpu.reg(3), expected);
        assert_eq!(e.cpu.pc, 1);
    }

    #[test]
    fn unknown_func_only_advances() {
        let mut e = engine(&[alu(0b0111, 1, 2, 3)]);
        e.cpu.set_reg(1, 5);
        assert_eq!(e.step().unwrap(), Step::Next);
        assert_eq!(e.cpu.regs(), &[0, 5, 0, 0, 0, 0, 0, 0]);
        assert_eq!(e.cpu.pc, 1);
    }

    #[test]
    fn addi_wraps() {
        let mut e = engine(&[addi(1, 0, -1), addi(2, 1, 2)]);
        e.step().unwrap();
        assert_eq!(e.cpu.reg(1), 0xffff);
        e.step().unwrap();
        assert_eq!(e.cpu.reg(2), 1);
    }

    #[rstest]
    // negative immediates compare as large unsigned values
    #[case(5, -1, 1)]
    #[case(5, 6, 1)]
    #[case(5, 5, 0)]
    #[case(0xffff, -1, 0)]
    fn slti(#[case] reg: u16, #[case] imm: i16, #[case] expected: u16) {
        let word = (0b001 << 13) | (1 << 10) | (2 << 7) | (imm as u16 & 0x7f);
        let mut e = engine(&[word]);
        e.cpu.set_reg(1, reg);
        e.step().unwrap();
        assert_eq!(e.cpu.reg(2), expected);
    }

    #[test]
    fn load_and_store() {
        // sw $1, 10($0); lw $2, 10($0)
        let sw = (0b101 << 13) | (1 << 7) | 10;
        let lw = (0b100 << 13) | (2 << 7) | 10;
        let mut e = engine(&[sw, lw]);
        e.cpu.set_reg(1, 0xbeef);
        assert_eq!(
            e.step().unwrap(),
            Step::Mem(MemAccess {
                pc: 0,
                addr: 10,
                kind: MemKind::Store
            })
        );
        assert_eq!(e.memory.get(10), Some(0xbeef));
        assert_eq!(
            e.step().unwrap(),
            Step::Mem(MemAccess {
                pc: 1,
                addr: 10,
                kind: MemKind::Load
            })
        );
        assert_eq!(e.cpu.reg(2), 0xbeef);
        assert_eq!(e.cpu.pc, 2);
    }

    #[test]
    fn negative_offset() {
        // lw $2, -4($1)
        let lw = (0b100 << 13) | (1 << 10) | (2 << 7) | (-4i16 as u16 & 0x7f);
        let mut e = engine(&[lw]);
        e.cpu.set_reg(1, 20);
        e.memory.set(16, 42).unwrap();
        let Step::Mem(access) = e.step().unwrap() else {
            panic!("expected a memory access");
        };
        assert_eq!(access.addr, 16);
        assert_eq!(e.cpu.reg(2), 42);
    }

    #[test]
    fn address_below_zero_is_fatal() {
        let lw = (0b100 << 13) | (2 << 7) | (-1i16 as u16 & 0x7f);
        let mut e = engine(&[lw]);
        assert!(matches!(
            e.step(),
            Err(SimError::AddressOutOfRange { pc: 0, addr: -1 })
        ));
    }

    #[test]
    fn address_past_memory_is_fatal() {
        let sw = (0b101 << 13) | (1 << 10) | 5;
        let mut e = engine(&[sw]);
        e.cpu.set_reg(1, 0x7fff);
        assert!(matches!(
            e.step(),
            Err(SimError::AddressOutOfRange { addr: 0x8004, .. })
        ));
    }

    #[test]
    fn jeq_taken_and_not_taken() {
        // jeq $1, $2, -1 at pc 1 loops back to itself when equal
        let jeq = (0b110 << 13) | (1 << 10) | (2 << 7) | (-1i16 as u16 & 0x7f);
        let mut e = engine(&[0, jeq]);
        e.cpu.pc = 1;
        e.step().unwrap();
        assert_eq!(e.cpu.pc, 1);
        e.cpu.set_reg(1, 1);
        e.step().unwrap();
        assert_eq!(e.cpu.pc, 2);
    }

    #[test]
    fn jr_uses_raw_register() {
        let mut e = engine(&[alu(0b1000, 4, 0, 0)]);
        e.cpu.set_reg(4, 300);
        e.step().unwrap();
        assert_eq!(e.cpu.pc, 300);
    }

    #[test]
    fn jr_past_memory_is_fatal() {
        let mut e = engine(&[alu(0b1000, 4, 0, 0)]);
        e.cpu.set_reg(4, 0x8000);
        assert!(matches!(e.step(), Err(SimError::PcOutOfRange(0x8000))));
    }

    #[test]
    fn jump_and_halt() {
        let j = (0b010 << 13) | 2;
        let halt = (0b010 << 13) | 2;
        let mut e = engine(&[j, 0, halt]);
        assert_eq!(e.step().unwrap(), Step::Next);
        assert_eq!(e.cpu.pc, 2);
        assert_eq!(e.step().unwrap(), Step::Halt);
        assert_eq!(e.cpu.pc, 2);
        assert_eq!(e.cpu.instr_idx, 2);
    }

    #[test]
    fn jal_links_even_when_halting() {
        let jal = (0b011 << 13) | 3;
        let jal_self = (0b011 << 13) | 3;
        let mut e = engine(&[jal, 0, 0, jal_self]);
        e.step().unwrap();
        assert_eq!(e.cpu.reg(7), 1);
        assert_eq!(e.cpu.pc, 3);
        assert_eq!(e.step().unwrap(), Step::Halt);
        assert_eq!(e.cpu.reg(7), 4);
    }
}
