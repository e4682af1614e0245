//! Embedding-based skill matching.
//!
//! The description is reduced to the mean of its known word vectors, then
//! compared by cosine similarity against every skill vector in the store.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::Result;
use crate::ranking::cancel::CancelToken;
use crate::ranking::normalize::NormalizedDescription;
use crate::ranking::topk::top_k;
use crate::ranking::types::{
    EmbeddingVector, NoMatchReason, RankedSkill, RankingOutcome, RankingResult, Strategy,
};
use crate::ranking::vector::{VectorError, average, cosine_similarity, magnitude};
use crate::storage::{SkillVectorSource, WordVectorTable};

/// Mean embedding of a description and the words that contributed to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionVector {
    pub vector: EmbeddingVector,
    /// Known words, deduplicated.
    pub matched_words: BTreeSet<String>,
    /// Number of tokens averaged, duplicates included.
    pub matched_tokens: usize,
}

/// Strategy 2: nearest skills to the mean description embedding.
pub struct SemanticSkillMatcher<'a> {
    words: &'a WordVectorTable,
    skills: &'a dyn SkillVectorSource,
}

impl<'a> SemanticSkillMatcher<'a> {
    pub fn new(words: &'a WordVectorTable, skills: &'a dyn SkillVectorSource) -> Self {
        Self { words, skills }
    }

    /// Average the vectors of every known token.
    ///
    /// Returns `None` when no token has a vector; callers must not search
    /// with a stand-in vector in that case.
    pub fn description_vector(
        &self,
        description: &NormalizedDescription,
    ) -> Option<DescriptionVector> {
        let mut matched_words = BTreeSet::new();
        let mut vectors = Vec::new();
        for token in description {
            if let Some(vector) = self.words.get(token) {
                vectors.push(vector);
                matched_words.insert(token.clone());
            }
        }

        // Every table entry has the table's width, so averaging cannot fail.
        let vector = average(&vectors).ok().flatten()?;
        Some(DescriptionVector {
            vector,
            matched_words,
            matched_tokens: vectors.len(),
        })
    }

    pub fn rank(
        &self,
        description: &NormalizedDescription,
        k: usize,
        cancel: &CancelToken,
    ) -> Result<RankingOutcome> {
        if description.is_empty() {
            return Ok(no_match(NoMatchReason::EmptyDescription));
        }
        let Some(described) = self.description_vector(description) else {
            return Ok(no_match(NoMatchReason::NoKnownEmbeddings));
        };
        if magnitude(&described.vector) == 0.0 {
            return Ok(no_match(NoMatchReason::DegenerateDescription));
        }

        cancel.check()?;
        let records = self.skills.fetch_all()?;
        cancel.check()?;

        let query = described.vector.as_slice();
        let similarities: Vec<Option<(String, f64)>> = records
            .into_par_iter()
            .map(|record| match cosine_similarity(query, &record.vector) {
                Ok(similarity) => Some((record.skill, similarity)),
                Err(VectorError::Degenerate) => {
                    debug!(skill = %record.skill, "skipping zero-magnitude skill vector");
                    None
                }
                Err(err) => {
                    warn!(skill = %record.skill, error = %err, "skipping skill vector");
                    None
                }
            })
            .collect();
        let candidates: Vec<(String, f64)> = similarities.into_iter().flatten().collect();

        debug!(
            tokens = description.len(),
            matched = described.matched_tokens,
            candidates = candidates.len(),
            "computed skill similarities"
        );
        if candidates.is_empty() {
            return Ok(no_match(NoMatchReason::NoSkillVectors));
        }

        let skills = top_k(candidates, k)
            .into_iter()
            .map(|(skill, score)| RankedSkill {
                skill,
                score,
                contributing_words: BTreeSet::new(),
            })
            .collect();

        Ok(RankingOutcome::Ranked(RankingResult {
            strategy: Strategy::Semantic,
            skills,
            matched_words: described.matched_words.into_iter().collect(),
        }))
    }
}

const fn no_match(reason: NoMatchReason) -> RankingOutcome {
    RankingOutcome::no_match(Strategy::Semantic, reason)
}
