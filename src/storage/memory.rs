//! In-memory store implementing every ranking collaborator.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::Result;
use crate::ranking::types::{SkillVectorRecord, SkillWeight};
use crate::storage::{PopularitySource, SkillDictionary, SkillVectorSource, parse_skill_record};

/// `HashMap`-backed store, safe for concurrent readers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    words: RwLock<HashMap<String, Vec<SkillWeight>>>,
    skill_vectors: RwLock<Vec<SkillVectorRecord>>,
    popularity: RwLock<HashMap<String, f64>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw `skill;weight;...` record for `word`. Returns the number
    /// of malformed pairs that were dropped.
    pub fn insert_word_record(&self, word: &str, record: &str) -> usize {
        let parsed = parse_skill_record(record);
        self.words.write().insert(word.to_lowercase(), parsed.entries);
        parsed.skipped
    }

    pub fn insert_skill_vector(&self, skill: &str, vector: Vec<f32>) {
        self.skill_vectors.write().push(SkillVectorRecord {
            skill: skill.to_string(),
            vector,
        });
    }

    pub fn insert_popularity(&self, skill: &str, average_views: f64) {
        self.popularity
            .write()
            .insert(skill.to_lowercase(), average_views);
    }
}

impl SkillDictionary for MemoryStore {
    fn lookup(&self, word: &str) -> Result<Vec<SkillWeight>> {
        Ok(self.words.read().get(word).cloned().unwrap_or_default())
    }
}

impl SkillVectorSource for MemoryStore {
    fn fetch_all(&self) -> Result<Vec<SkillVectorRecord>> {
        Ok(self.skill_vectors.read().clone())
    }
}

impl PopularitySource for MemoryStore {
    fn lookup(&self, skill: &str) -> Result<Option<f64>> {
        Ok(self.popularity.read().get(skill).copied())
    }

    fn max_popularity(&self) -> Result<Option<f64>> {
        Ok(self.popularity.read().values().copied().reduce(f64::max))
    }
}
