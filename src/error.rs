use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("can't parse line {line_no}: {line}")]
    ImageParse { line_no: usize, line: String },

    #[error("memory addresses encountered out of sequence: {0}")]
    OutOfSequence(usize),

    #[error("program too large: address {addr} does not fit in {mem_size} words")]
    ImageTooLarge { addr: usize, mem_size: usize },

    #[error("invalid cache config: {0}")]
    Config(String),

    #[error("pc {pc}: memory address {addr} out of range")]
    AddressOutOfRange { pc: usize, addr: i32 },

    #[error("pc {0} out of range")]
    PcOutOfRange(i32),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
