//! Popularity-weighted rescoring of lexical results.
//!
//! Each lexical score is rescaled by the skill's popularity, normalized by a
//! corpus-wide maximum. Two blend policies are available:
//!
//! - `multiplicative` (default): `(1 - λ) * base * (λ * pop / max)`. A skill
//!   with zero popularity ends at zero regardless of its lexical score.
//! - `linear`: `(1 - λ) * base + λ * (pop / max)`.
//!
//! Skills missing from the popularity store keep their lexical score.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, SmError};
use crate::ranking::cancel::CancelToken;
use crate::ranking::lexical::{LexicalSkillMatcher, rank_scores};
use crate::ranking::normalize::NormalizedDescription;
use crate::ranking::types::{NoMatchReason, RankingOutcome, Strategy};
use crate::storage::PopularitySource;

/// Default blend weight.
pub const DEFAULT_LAMBDA: f64 = 0.5;

/// Default normalization constant for popularity counts.
pub const DEFAULT_MAX_POPULARITY: f64 = 40175.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendPolicy {
    #[default]
    Multiplicative,
    Linear,
}

impl fmt::Display for BlendPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Multiplicative => "multiplicative",
            Self::Linear => "linear",
        })
    }
}

impl FromStr for BlendPolicy {
    type Err = SmError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "multiplicative" | "product" => Ok(Self::Multiplicative),
            "linear" | "sum" => Ok(Self::Linear),
            other => Err(SmError::Config(format!(
                "unknown blend policy {other} (expected multiplicative|linear)"
            ))),
        }
    }
}

/// Validated popularity blending parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopularityWeighting {
    lambda: f64,
    max_popularity: f64,
    blend: BlendPolicy,
}

impl Default for PopularityWeighting {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            max_popularity: DEFAULT_MAX_POPULARITY,
            blend: BlendPolicy::default(),
        }
    }
}

impl PopularityWeighting {
    pub fn new(lambda: f64, max_popularity: f64, blend: BlendPolicy) -> Result<Self> {
        if !(0.0..=1.0).contains(&lambda) {
            return Err(SmError::Config(format!(
                "popularity lambda must be within [0, 1], got {lambda}"
            )));
        }
        if !max_popularity.is_finite() || max_popularity <= 0.0 {
            return Err(SmError::Config(format!(
                "max popularity must be a positive number, got {max_popularity}"
            )));
        }
        Ok(Self {
            lambda,
            max_popularity,
            blend,
        })
    }

    pub const fn lambda(&self) -> f64 {
        self.lambda
    }

    pub const fn max_popularity(&self) -> f64 {
        self.max_popularity
    }

    pub const fn blend(&self) -> BlendPolicy {
        self.blend
    }

    /// Final score for a skill. `None` popularity leaves `base` untouched.
    pub fn apply(&self, base: f64, popularity: Option<f64>) -> f64 {
        let Some(popularity) = popularity else {
            return base;
        };
        let normalized = popularity.max(0.0) / self.max_popularity;
        match self.blend {
            BlendPolicy::Multiplicative => (1.0 - self.lambda) * base * (self.lambda * normalized),
            BlendPolicy::Linear => (1.0 - self.lambda).mul_add(base, self.lambda * normalized),
        }
    }
}

/// Strategy 3: lexical scores rescaled by popularity.
pub struct PopularityWeightedRanker<'a> {
    lexical: LexicalSkillMatcher<'a>,
    popularity: &'a dyn PopularitySource,
    weighting: PopularityWeighting,
}

impl<'a> PopularityWeightedRanker<'a> {
    pub const fn new(
        lexical: LexicalSkillMatcher<'a>,
        popularity: &'a dyn PopularitySource,
        weighting: PopularityWeighting,
    ) -> Self {
        Self {
            lexical,
            popularity,
            weighting,
        }
    }

    pub fn rank(
        &self,
        description: &NormalizedDescription,
        k: usize,
        cancel: &CancelToken,
    ) -> Result<RankingOutcome> {
        if description.is_empty() {
            return Ok(RankingOutcome::no_match(
                Strategy::PopularityWeighted,
                NoMatchReason::EmptyDescription,
            ));
        }

        let mut scores = self.lexical.score(description, cancel)?;
        if scores.skills.is_empty() {
            return Ok(rank_scores(Strategy::PopularityWeighted, scores, k));
        }

        let keys: Vec<String> = scores.skills.iter().map(|s| s.key.clone()).collect();
        cancel.check()?;
        let popularity = self.popularity.lookup_many(&keys)?;
        cancel.check()?;

        for skill in &mut scores.skills {
            skill.score = self
                .weighting
                .apply(skill.score, popularity.get(&skill.key).copied());
        }
        debug!(
            candidates = scores.skills.len(),
            with_popularity = popularity.len(),
            lambda = self.weighting.lambda(),
            blend = %self.weighting.blend(),
            "applied popularity weighting"
        );

        Ok(rank_scores(Strategy::PopularityWeighted, scores, k))
    }
}
