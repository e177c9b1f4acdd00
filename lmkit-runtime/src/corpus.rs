//! Newline-delimited, whitespace-tokenized corpora.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use lmkit_core::{LmError, Result};

/// Yields one sentence per line. Blank lines yield empty sentences.
pub struct SentenceReader<R> {
    lines: Lines<R>,
}

impl SentenceReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LmError::FileNotFound(path.to_path_buf()));
        }
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> SentenceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }
}

impl<R: BufRead> Iterator for SentenceReader<R> {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        Some(
            line.map(|l| l.split_whitespace().map(String::from).collect())
                .map_err(LmError::from),
        )
    }
}
