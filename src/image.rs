use std::{
    fs,
    io::{self, BufRead, BufReader},
    path::Path,
    sync::LazyLock,
};

use regex::Regex;

use crate::error::{Result, SimError};

static PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ram\[(\d+)\] = 16'b(\d+);.*$").unwrap());

/// Flat word-addressed memory holding both program and data.
#[derive(Debug, Clone)]
pub struct MachineImage {
    words: Vec<u16>,
}

impl MachineImage {
    pub fn new(mem_size: usize) -> Self {
        MachineImage {
            words: vec![0; mem_size],
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, addr: usize) -> Option<u16> {
        self.words.get(addr).copied()
    }

    pub fn set(&mut self, addr: usize, value: u16) -> Option<()> {
        self.words.get_mut(addr).map(|w| *w = value)
    }

    pub fn words(&self) -> &[u16] {
        &self.words
    }

    pub fn read(path: &Path, mem_size: usize) -> Result<Self> {
        let file = fs::File::open(path)?;
        let lines = BufReader::new(file)
            .lines()
            .collect::<io::Result<Vec<_>>>()?;
        Self::load(lines, mem_size)
    }

    /// Loads `ram[<addr>] = 16'b<bits>;` lines. Addresses must run from 0
    /// without gaps.
    pub fn load<I, S>(lines: I, mem_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut image = MachineImage::new(mem_size);
        let mut expected = 0usize;
        for (line_no, line) in lines.into_iter().enumerate() {
            let line = line.as_ref();
            let bad_line = || SimError::ImageParse {
                line_no: line_no + 1,
                line: line.to_string(),
            };
            let caps = PATTERN.captures(line).ok_or_else(bad_line)?;
            let addr: usize = caps[1].parse().map_err(|_| bad_line())?;
            let word = u16::from_str_radix(&caps[2], 2).map_err(|_| bad_line())?;
            if addr != expected {
                return Err(SimError::OutOfSequence(addr));
            }
            image
                .set(addr, word)
                .ok_or(SimError::ImageTooLarge { addr, mem_size })?;
            expected += 1;
        }
        log::debug!("loaded {expected} words");
        Ok(image)
    }
}
