//! Data model shared by the ranking strategies.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SmError;

/// Width of the pre-computed word and skill embeddings.
pub const DEFAULT_EMBEDDING_DIMS: usize = 300;

/// Number of skills returned when the caller does not ask for a limit.
pub const DEFAULT_TOP_K: usize = 10;

/// Fixed-width embedding. The all-zero vector is valid and means "no contribution".
pub type EmbeddingVector = Vec<f32>;

/// Ranking pipeline selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Dictionary lookup of each word.
    Lexical,
    /// Mean word embedding compared against every skill embedding.
    Semantic,
    /// Lexical scores rescaled by skill popularity.
    #[serde(rename = "popularity")]
    PopularityWeighted,
}

impl Strategy {
    pub const ALL: [Self; 3] = [Self::Lexical, Self::Semantic, Self::PopularityWeighted];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::Semantic => "semantic",
            Self::PopularityWeighted => "popularity",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lexical" | "dictionary" | "1" => Ok(Self::Lexical),
            "semantic" | "embedding" | "2" => Ok(Self::Semantic),
            "popularity" | "popularity_weighted" | "popularityweighted" | "popularity-weighted"
            | "3" => Ok(Self::PopularityWeighted),
            other => Err(SmError::Config(format!(
                "unknown strategy {other} (expected lexical|semantic|popularity)"
            ))),
        }
    }
}

/// One (skill, weight) pair from a dictionary record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillWeight {
    /// Bracket-stripped skill name as stored (display form).
    pub skill: String,
    pub weight: f64,
}

impl SkillWeight {
    pub fn new(skill: impl Into<String>, weight: f64) -> Self {
        Self {
            skill: skill.into(),
            weight,
        }
    }
}

/// A skill name paired with its embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillVectorRecord {
    pub skill: String,
    pub vector: EmbeddingVector,
}

/// A single ranked skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSkill {
    pub skill: String,
    pub score: f64,
    /// Description words that mapped to this skill. Empty for the semantic strategy.
    #[serde(default)]
    pub contributing_words: BTreeSet<String>,
}

/// Top-K skills plus every description word that matched anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub strategy: Strategy,
    pub skills: Vec<RankedSkill>,
    /// Sorted and deduplicated.
    pub matched_words: Vec<String>,
}

/// Why a request produced no ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoMatchReason {
    /// Normalization left no tokens.
    EmptyDescription,
    /// No token had a usable dictionary record.
    NoDictionaryMatches,
    /// No token had a known embedding.
    NoKnownEmbeddings,
    /// The mean description vector has zero magnitude.
    DegenerateDescription,
    /// The skill vector store returned no usable records.
    NoSkillVectors,
}

impl fmt::Display for NoMatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::EmptyDescription => "description has no words left after normalization",
            Self::NoDictionaryMatches => "no description word is in the skill dictionary",
            Self::NoKnownEmbeddings => "no description word has a known embedding",
            Self::DegenerateDescription => "description embedding has zero magnitude",
            Self::NoSkillVectors => "no skill vectors are available",
        };
        f.write_str(text)
    }
}

/// Result of a ranking request. "No match" is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RankingOutcome {
    Ranked(RankingResult),
    NoMatch {
        strategy: Strategy,
        reason: NoMatchReason,
    },
}

impl RankingOutcome {
    pub const fn no_match(strategy: Strategy, reason: NoMatchReason) -> Self {
        Self::NoMatch { strategy, reason }
    }

    pub const fn ranked(&self) -> Option<&RankingResult> {
        match self {
            Self::Ranked(result) => Some(result),
            Self::NoMatch { .. } => None,
        }
    }

    pub fn into_ranked(self) -> Option<RankingResult> {
        match self {
            Self::Ranked(result) => Some(result),
            Self::NoMatch { .. } => None,
        }
    }

    pub const fn no_match_reason(&self) -> Option<NoMatchReason> {
        match self {
            Self::Ranked(_) => None,
            Self::NoMatch { reason, .. } => Some(*reason),
        }
    }

    pub const fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_aliases() {
        assert_eq!("Lexical".parse::<Strategy>().unwrap(), Strategy::Lexical);
        assert_eq!("semantic".parse::<Strategy>().unwrap(), Strategy::Semantic);
        assert_eq!(
            "popularityWeighted".parse::<Strategy>().unwrap(),
            Strategy::PopularityWeighted
        );
        assert_eq!("3".parse::<Strategy>().unwrap(), Strategy::PopularityWeighted);
        assert!("taxonomy".parse::<Strategy>().is_err());
    }

    #[test]
    fn test_strategy_round_trips_through_display() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
    }

    #[test]
    fn test_no_match_outcome_serializes_with_tag() {
        let outcome = RankingOutcome::no_match(Strategy::Semantic, NoMatchReason::NoKnownEmbeddings);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "no_match");
        assert_eq!(json["reason"], "no_known_embeddings");
        assert_eq!(json["strategy"], "semantic");
    }
}
