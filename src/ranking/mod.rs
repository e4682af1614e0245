//! Skill scoring and ranking engine.
//!
//! Three strategies share one pipeline: normalize the description, score
//! candidate skills, then keep the top K.
//!
//! - **lexical**: dictionary lookup per word, normalized by description
//!   length and skill word count.
//! - **semantic**: mean word embedding against every skill embedding.
//! - **popularity**: lexical scores rescaled by skill popularity.

pub mod cancel;
pub mod lexical;
pub mod normalize;
pub mod orchestrator;
pub mod popularity;
pub mod semantic;
pub mod topk;
pub mod types;
pub mod vector;

pub use cancel::CancelToken;
pub use lexical::{LexicalSkillMatcher, SkillAccumulator, SkillTally};
pub use normalize::{NormalizedDescription, TextNormalizer};
pub use orchestrator::{RankingStores, SkillRanker};
pub use popularity::{BlendPolicy, PopularityWeightedRanker, PopularityWeighting};
pub use semantic::{DescriptionVector, SemanticSkillMatcher};
pub use topk::{top_k, top_k_by};
pub use types::{
    DEFAULT_EMBEDDING_DIMS, DEFAULT_TOP_K, EmbeddingVector, NoMatchReason, RankedSkill,
    RankingOutcome, RankingResult, SkillVectorRecord, SkillWeight, Strategy,
};
pub use vector::{VectorError, average, cosine_similarity};
