//! E20 instruction decoding.
//!
//! Every instruction is a 16-bit word. The top three bits select the family:
//!
//! | prefix | family |
//! |---|---|
//! | `000` | three-register ALU and `jr` |
//! | `001` / `111` | `slti` / `addi` |
//! | `100` / `101` | `lw` / `sw` |
//! | `110` | `jeq` |
//! | `010` / `011` | `j` / `jal` |

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    And,
    Or,
    Slt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Alu {
        op: AluOp,
        dst: usize,
        src_a: usize,
        src_b: usize,
    },
    Jr {
        src: usize,
    },
    /// Three-register encoding with an unassigned function code.
    Nop,
    Slti {
        dst: usize,
        src: usize,
        imm: i16,
    },
    Addi {
        dst: usize,
        src: usize,
        imm: i16,
    },
    Lw {
        dst: usize,
        base: usize,
        imm: i16,
    },
    Sw {
        src: usize,
        base: usize,
        imm: i16,
    },
    Jeq {
        reg_a: usize,
        reg_b: usize,
        imm: i16,
    },
    J {
        target: usize,
    },
    Jal {
        target: usize,
    },
}

const REG_A_SHIFT: u16 = 10;
const REG_B_SHIFT: u16 = 7;
const REG_C_SHIFT: u16 = 4;
const JUMP_MASK: u16 = 0x1fff;
const FUNC_MASK: u16 = 0xf;

fn reg(word: u16, shift: u16) -> usize {
    ((word >> shift) & 0b111) as usize
}

/// Bits `[6:0]` as a two's complement value in `[-64, 63]`.
fn imm7(word: u16) -> i16 {
    let low = (word & 0x3f) as i16;
    if word & 0x40 != 0 {
        low - 64
    } else {
        low
    }
}

fn three_reg(word: u16) -> Instr {
    let src_a = reg(word, REG_A_SHIFT);
    let src_b = reg(word, REG_B_SHIFT);
    let dst = reg(word, REG_C_SHIFT);
    let op = match word & FUNC_MASK {
        0b0000 => AluOp::Add,
        0b0001 => AluOp::Sub,
        0b0010 => AluOp::And,
        0b0011 => AluOp::Or,
        0b0100 => AluOp::Slt,
        0b1000 => return Instr::Jr { src: src_a },
        _ => return Instr::Nop,
    };
    Instr::Alu {
        op,
        dst,
        src_a,
        src_b,
    }
}

pub fn decode(word: u16) -> Instr {
    let ra = reg(word, REG_A_SHIFT);
    let rb = reg(word, REG_B_SHIFT);
    match word >> 13 {
        0b000 => three_reg(word),
        0b001 => Instr::Slti {
            dst: rb,
            src: ra,
            imm: imm7(word),
        },
        0b111 => Instr::Addi {
            dst: rb,
            src: ra,
            imm: imm7(word),
        },
        0b100 => Instr::Lw {
            dst: rb,
            base: ra,
            imm: imm7(word),
        },
        0b101 => Instr::Sw {
            src: rb,
            base: ra,
            imm: imm7(word),
        },
        0b110 => Instr::Jeq {
            reg_a: ra,
            reg_b: rb,
            imm: imm7(word),
        },
        0b010 => Instr::J {
            target: (word & JUMP_MASK) as usize,
        },
        _ => Instr::Jal {
            target: (word & JUMP_MASK) as usize,
        },
    }
}
