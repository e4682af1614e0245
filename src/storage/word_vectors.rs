//! Pre-loaded word embedding table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{Result, SmError};
use crate::ranking::types::EmbeddingVector;

/// Lowercase word → embedding, all of one fixed width.
#[derive(Debug, Clone)]
pub struct WordVectorTable {
    dims: usize,
    vectors: HashMap<String, EmbeddingVector>,
}

impl WordVectorTable {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            vectors: HashMap::new(),
        }
    }

    pub const fn dims(&self) -> usize {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.vectors.contains_key(word)
    }

    /// Insert or replace a word's vector. The word is lowercased.
    pub fn insert(&mut self, word: &str, vector: EmbeddingVector) -> Result<()> {
        if vector.len() != self.dims {
            return Err(SmError::DimensionMismatch {
                expected: self.dims,
                actual: vector.len(),
            });
        }
        self.vectors.insert(word.to_lowercase(), vector);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.vectors
            .iter()
            .map(|(word, vector)| (word.as_str(), vector.as_slice()))
    }

    /// Parse a JSON object of the form `{"word": [f32, ...], ...}`.
    pub fn from_json_reader(reader: impl Read, dims: usize) -> Result<Self> {
        let raw: HashMap<String, EmbeddingVector> = serde_json::from_reader(reader)?;
        let mut table = Self::new(dims);
        for (word, vector) in raw {
            table.insert(&word, vector)?;
        }
        Ok(table)
    }

    pub fn from_json_path(path: &Path, dims: usize) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_json_reader(std::io::BufReader::new(file), dims)?;
        info!(path = %path.display(), words = table.len(), dims, "loaded word vectors");
        Ok(table)
    }
}
