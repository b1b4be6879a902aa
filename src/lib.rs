//! Simulator for the E20 instruction set with a one- or two-level
//! set-associative LRU cache model in front of memory.

pub mod cache;
pub mod config;
pub mod cpu;
pub mod engine;
pub mod error;
pub mod hierarchy;
pub mod image;
pub mod isa;
pub mod replace;
pub mod sim;
pub mod trace;

pub use error::{Result, SimError};
