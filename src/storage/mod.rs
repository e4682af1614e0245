//! Read-only stores consumed by the ranking engine.
//!
//! The engine talks to three stores through traits: a word → skill
//! dictionary, a bulk table of skill embeddings, and skill popularity counts.
//! Word embeddings live in a pre-loaded [`WordVectorTable`].
//!
//! Implementations must tolerate concurrent readers.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::error::Result;
use crate::ranking::types::{SkillVectorRecord, SkillWeight};

pub mod memory;
pub mod record;
pub mod sqlite;
pub mod word_vectors;

pub use memory::MemoryStore;
pub use record::{ParsedRecord, clean_skill_name, format_skill_record, parse_skill_record};
pub use sqlite::{Database, StoreStats};
pub use word_vectors::WordVectorTable;

/// Word → weighted skills lookup.
pub trait SkillDictionary: Send + Sync {
    /// Skills for one lowercase word; empty when the word is unknown.
    fn lookup(&self, word: &str) -> Result<Vec<SkillWeight>>;

    /// Skills for many words at once. Unknown words may be absent from the map.
    ///
    /// The default runs independent lookups in parallel and fails if any of
    /// them fails.
    fn lookup_many(&self, words: &[String]) -> Result<HashMap<String, Vec<SkillWeight>>> {
        words
            .par_iter()
            .map(|word| self.lookup(word).map(|hits| (word.clone(), hits)))
            .collect()
    }
}

/// Bulk source of skill embeddings.
pub trait SkillVectorSource: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<SkillVectorRecord>>;
}

/// Skill popularity counts plus their corpus-wide maximum.
pub trait PopularitySource: Send + Sync {
    /// Popularity of a lowercase skill name, if known.
    fn lookup(&self, skill: &str) -> Result<Option<f64>>;

    /// Popularity of many skills; unknown skills are absent from the map.
    fn lookup_many(&self, skills: &[String]) -> Result<HashMap<String, f64>> {
        let found: Vec<Option<(String, f64)>> = skills
            .par_iter()
            .map(|skill| {
                self.lookup(skill)
                    .map(|value| value.map(|value| (skill.clone(), value)))
            })
            .collect::<Result<_>>()?;
        Ok(found.into_iter().flatten().collect())
    }

    /// Largest popularity in the store, when the store can report one.
    fn max_popularity(&self) -> Result<Option<f64>> {
        Ok(None)
    }
}
