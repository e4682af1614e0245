//! Dictionary-driven skill matching.
//!
//! Every description token is looked up in the skill dictionary and each
//! returned weight is added to that skill's tally. Final scores divide the
//! tally by the description length and by the number of words in the skill
//! name:
//!
//! ```text
//! score(skill) = weight(skill) / (len(description) * word_count(skill))
//! ```

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::error::Result;
use crate::ranking::cancel::CancelToken;
use crate::ranking::normalize::NormalizedDescription;
use crate::ranking::topk::top_k;
use crate::ranking::types::{
    NoMatchReason, RankedSkill, RankingOutcome, RankingResult, SkillWeight, Strategy,
};
use crate::storage::SkillDictionary;

/// Running total for one skill.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillTally {
    /// First display form observed.
    pub display: String,
    /// Sum of every contributing weight, duplicates included.
    pub weight: f64,
    pub words: BTreeSet<String>,
}

/// Per-request map from lowercase skill name to its tally.
///
/// Iteration follows first-insertion order so ties rank deterministically.
#[derive(Debug, Clone, Default)]
pub struct SkillAccumulator {
    index: HashMap<String, usize>,
    tallies: Vec<(String, SkillTally)>,
}

impl SkillAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `hit.weight` to the skill and record `token` as a contributor.
    pub fn add(&mut self, token: &str, hit: &SkillWeight) {
        debug_assert!(hit.weight >= 0.0, "dictionary weights are non-negative");
        let tally = self.entry(&hit.skill);
        tally.weight += hit.weight;
        tally.words.insert(token.to_string());
    }

    /// Fold another accumulator into this one. Display names already present
    /// here win.
    pub fn merge(&mut self, other: Self) {
        for (_, incoming) in other.tallies {
            let tally = self.entry(&incoming.display);
            tally.weight += incoming.weight;
            tally.words.extend(incoming.words);
        }
    }

    fn entry(&mut self, display: &str) -> &mut SkillTally {
        let key = display.to_lowercase();
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.tallies.len();
                self.index.insert(key.clone(), slot);
                self.tallies.push((
                    key,
                    SkillTally {
                        display: display.to_string(),
                        weight: 0.0,
                        words: BTreeSet::new(),
                    },
                ));
                slot
            }
        };
        &mut self.tallies[slot].1
    }

    pub fn get(&self, skill: &str) -> Option<&SkillTally> {
        self.index
            .get(&skill.to_lowercase())
            .map(|&slot| &self.tallies[slot].1)
    }

    pub fn weight(&self, skill: &str) -> Option<f64> {
        self.get(skill).map(|tally| tally.weight)
    }

    pub fn len(&self) -> usize {
        self.tallies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tallies.is_empty()
    }

    /// `(lowercase key, tally)` in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SkillTally)> {
        self.tallies.iter().map(|(key, tally)| (key.as_str(), tally))
    }
}

/// A skill with its normalized lexical score.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalScore {
    /// Lowercase skill name.
    pub key: String,
    pub display: String,
    pub score: f64,
    pub words: BTreeSet<String>,
}

impl From<LexicalScore> for RankedSkill {
    fn from(scored: LexicalScore) -> Self {
        Self {
            skill: scored.display,
            score: scored.score,
            contributing_words: scored.words,
        }
    }
}

/// Normalized scores for every candidate skill of one description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalScores {
    /// Candidates in first-encountered order.
    pub skills: Vec<LexicalScore>,
    /// Tokens that produced at least one usable dictionary entry.
    pub matched_words: BTreeSet<String>,
    pub description_len: usize,
}

/// Number of space-separated words in a skill name, at least one.
pub fn word_count(skill: &str) -> usize {
    skill.split_whitespace().count().max(1)
}

/// `weight / (description_len * word_count)`.
#[allow(clippy::cast_precision_loss)]
pub fn normalized_score(weight: f64, description_len: usize, word_count: usize) -> f64 {
    weight / (description_len as f64 * word_count as f64)
}

/// Strategy 1: dictionary lookup scoring.
pub struct LexicalSkillMatcher<'a> {
    dictionary: &'a dyn SkillDictionary,
}

impl<'a> LexicalSkillMatcher<'a> {
    pub fn new(dictionary: &'a dyn SkillDictionary) -> Self {
        Self { dictionary }
    }

    /// Build the accumulator for a description.
    ///
    /// Each distinct word is looked up once; its hits are applied once per
    /// occurrence, so repeated words count repeatedly.
    pub fn accumulate(
        &self,
        description: &NormalizedDescription,
        cancel: &CancelToken,
    ) -> Result<(SkillAccumulator, BTreeSet<String>)> {
        let distinct = description.distinct();
        cancel.check()?;
        let hits = self.dictionary.lookup_many(&distinct)?;
        cancel.check()?;

        let mut accumulator = SkillAccumulator::new();
        let mut matched = BTreeSet::new();
        for token in description {
            let Some(entries) = hits.get(token) else {
                continue;
            };
            if entries.is_empty() {
                continue;
            }
            matched.insert(token.clone());
            for entry in entries {
                accumulator.add(token, entry);
            }
        }

        debug!(
            tokens = description.len(),
            distinct = distinct.len(),
            matched = matched.len(),
            skills = accumulator.len(),
            "accumulated dictionary hits"
        );
        Ok((accumulator, matched))
    }

    /// Score every candidate skill. Returns empty scores for an empty description.
    pub fn score(
        &self,
        description: &NormalizedDescription,
        cancel: &CancelToken,
    ) -> Result<LexicalScores> {
        if description.is_empty() {
            return Ok(LexicalScores::default());
        }

        let (accumulator, matched_words) = self.accumulate(description, cancel)?;
        let description_len = description.len();
        let skills = accumulator
            .iter()
            .map(|(key, tally)| LexicalScore {
                key: key.to_string(),
                display: tally.display.clone(),
                score: normalized_score(tally.weight, description_len, word_count(key)),
                words: tally.words.clone(),
            })
            .collect();

        Ok(LexicalScores {
            skills,
            matched_words,
            description_len,
        })
    }

    pub fn rank(
        &self,
        description: &NormalizedDescription,
        k: usize,
        cancel: &CancelToken,
    ) -> Result<RankingOutcome> {
        if description.is_empty() {
            return Ok(RankingOutcome::no_match(
                Strategy::Lexical,
                NoMatchReason::EmptyDescription,
            ));
        }
        let scores = self.score(description, cancel)?;
        Ok(rank_scores(Strategy::Lexical, scores, k))
    }
}

/// Select the top `k` of already-scored lexical candidates.
pub(crate) fn rank_scores(strategy: Strategy, scores: LexicalScores, k: usize) -> RankingOutcome {
    if scores.skills.is_empty() {
        return RankingOutcome::no_match(strategy, NoMatchReason::NoDictionaryMatches);
    }
    let skills = top_k(
        scores.skills.into_iter().map(|scored| {
            let score = scored.score;
            (scored, score)
        }),
        k,
    )
    .into_iter()
    .map(|(scored, _)| RankedSkill::from(scored))
    .collect();

    RankingOutcome::Ranked(RankingResult {
        strategy,
        skills,
        matched_words: scores.matched_words.into_iter().collect(),
    })
}
