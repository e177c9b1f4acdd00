//! Read-only token <-> index mapping with reserved sentinels.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{LmError, Result};

pub const PADDING_TOKEN: &str = "<pad>";
pub const UNKNOWN_TOKEN: &str = "<unk>";
pub const START_TOKEN: &str = "<s>";
pub const END_TOKEN: &str = "</s>";

/// Indices of the reserved tokens. Fixed for the lifetime of a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub padding: u32,
    pub unknown: u32,
    pub start: u32,
    pub end: u32,
}

impl SpecialTokens {
    pub fn contains(&self, index: u32) -> bool {
        index == self.padding || index == self.unknown || index == self.start || index == self.end
    }
}

/// Injective bidirectional mapping between surface tokens and dense indices.
///
/// The four reserved tokens always occupy indices 0..4 (padding, unknown,
/// start, end); regular tokens follow in insertion order.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    token_to_index: HashMap<String, u32>,
    index_to_token: Vec<String>,
    specials: SpecialTokens,
}

impl Vocabulary {
    /// Build a vocabulary from regular tokens. Duplicates, and tokens that
    /// collide with a reserved sentinel, are ignored.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self {
            token_to_index: HashMap::new(),
            index_to_token: Vec::new(),
            specials: SpecialTokens {
                padding: 0,
                unknown: 1,
                start: 2,
                end: 3,
            },
        };
        for reserved in [PADDING_TOKEN, UNKNOWN_TOKEN, START_TOKEN, END_TOKEN] {
            vocab.insert(reserved.to_string());
        }
        for token in tokens {
            vocab.insert(token.into());
        }
        vocab
    }

    /// Load a vocabulary from a file with one token per line. Blank lines are skipped.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(LmError::FileNotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(std::fs::File::open(path)?);
        let mut tokens = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let token = line.trim();
            if !token.is_empty() {
                tokens.push(token.to_string());
            }
        }
        Ok(Self::new(tokens))
    }

    fn insert(&mut self, token: String) {
        if self.token_to_index.contains_key(&token) {
            return;
        }
        let index = self.index_to_token.len() as u32;
        self.token_to_index.insert(token.clone(), index);
        self.index_to_token.push(token);
    }

    /// Index of `token`, or the unknown sentinel if it is not in the vocabulary.
    pub fn token_to_index(&self, token: &str) -> u32 {
        self.get(token).unwrap_or(self.specials.unknown)
    }

    pub fn get(&self, token: &str) -> Option<u32> {
        self.token_to_index.get(token).copied()
    }

    pub fn index_to_token(&self, index: u32) -> Option<&str> {
        self.index_to_token.get(index as usize).map(String::as_str)
    }

    pub fn vocab_size(&self) -> usize {
        self.index_to_token.len()
    }

    /// Tokens in index order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.index_to_token.iter().map(String::as_str)
    }

    pub fn specials(&self) -> SpecialTokens {
        self.specials
    }

    pub fn start_index(&self) -> u32 {
        self.specials.start
    }

    pub fn end_index(&self) -> u32 {
        self.specials.end
    }

    pub fn unknown_index(&self) -> u32 {
        self.specials.unknown
    }

    pub fn padding_index(&self) -> u32 {
        self.specials.padding
    }
}
