//! Strategy dispatch: normalize once, run one matcher, return the top K.

use tracing::{debug, instrument};

use crate::error::{Result, SmError, StoreKind};
use crate::ranking::cancel::CancelToken;
use crate::ranking::lexical::LexicalSkillMatcher;
use crate::ranking::normalize::TextNormalizer;
use crate::ranking::popularity::{PopularityWeightedRanker, PopularityWeighting};
use crate::ranking::semantic::SemanticSkillMatcher;
use crate::ranking::types::{NoMatchReason, RankingOutcome, Strategy};
use crate::storage::{PopularitySource, SkillDictionary, SkillVectorSource, WordVectorTable};

/// Read-only stores a ranking request may consult.
#[derive(Clone, Copy)]
pub struct RankingStores<'a> {
    pub dictionary: &'a dyn SkillDictionary,
    pub skill_vectors: &'a dyn SkillVectorSource,
    pub popularity: &'a dyn PopularitySource,
    /// Only the semantic strategy needs word vectors.
    pub word_vectors: Option<&'a WordVectorTable>,
}

impl<'a> RankingStores<'a> {
    /// Use one store for every role.
    pub fn single<S>(store: &'a S, word_vectors: Option<&'a WordVectorTable>) -> Self
    where
        S: SkillDictionary + SkillVectorSource + PopularitySource,
    {
        Self {
            dictionary: store,
            skill_vectors: store,
            popularity: store,
            word_vectors,
        }
    }
}

/// Entry point for ranking skills against a description.
///
/// Holds no per-request state; one ranker can serve concurrent calls.
pub struct SkillRanker<'a> {
    stores: RankingStores<'a>,
    normalizer: TextNormalizer,
    weighting: PopularityWeighting,
}

impl<'a> SkillRanker<'a> {
    pub fn new(stores: RankingStores<'a>) -> Self {
        Self {
            stores,
            normalizer: TextNormalizer::default(),
            weighting: PopularityWeighting::default(),
        }
    }

    #[must_use]
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    #[must_use]
    pub const fn with_weighting(mut self, weighting: PopularityWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    pub const fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub const fn weighting(&self) -> &PopularityWeighting {
        &self.weighting
    }

    /// Rank skills for `raw_text` with `strategy`, returning at most `k`.
    pub fn rank(&self, raw_text: &str, strategy: Strategy, k: usize) -> Result<RankingOutcome> {
        self.rank_with_cancel(raw_text, strategy, k, &CancelToken::new())
    }

    /// As [`Self::rank`], aborting with [`SmError::Cancelled`] once `cancel` fires.
    #[instrument(skip(self, raw_text, cancel), fields(chars = raw_text.len()))]
    pub fn rank_with_cancel(
        &self,
        raw_text: &str,
        strategy: Strategy,
        k: usize,
        cancel: &CancelToken,
    ) -> Result<RankingOutcome> {
        cancel.check()?;
        let description = self.normalizer.normalize(raw_text);
        debug!(tokens = description.len(), "normalized description");
        if description.is_empty() {
            return Ok(RankingOutcome::no_match(
                strategy,
                NoMatchReason::EmptyDescription,
            ));
        }

        let lexical = LexicalSkillMatcher::new(self.stores.dictionary);
        let outcome = match strategy {
            Strategy::Lexical => lexical.rank(&description, k, cancel)?,
            Strategy::PopularityWeighted => {
                PopularityWeightedRanker::new(lexical, self.stores.popularity, self.weighting)
                    .rank(&description, k, cancel)?
            }
            Strategy::Semantic => {
                let words = self.stores.word_vectors.ok_or_else(|| {
                    SmError::store(StoreKind::WordVectors, "word vector table is not loaded")
                })?;
                SemanticSkillMatcher::new(words, self.stores.skill_vectors)
                    .rank(&description, k, cancel)?
            }
        };

        // A cancel that lands during the last store call still discards the result.
        cancel.check()?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::types::{SkillVectorRecord, SkillWeight};
    use crate::storage::MemoryStore;

    /// Store whose every call fails as `kind` would.
    struct DownStore(StoreKind);

    impl SkillDictionary for DownStore {
        fn lookup(&self, _word: &str) -> Result<Vec<SkillWeight>> {
            Err(SmError::store(self.0, "down"))
        }
    }

    impl SkillVectorSource for DownStore {
        fn fetch_all(&self) -> Result<Vec<SkillVectorRecord>> {
            Err(SmError::store(self.0, "down"))
        }
    }

    impl PopularitySource for DownStore {
        fn lookup(&self, _skill: &str) -> Result<Option<f64>> {
            Err(SmError::store(self.0, "down"))
        }
    }

    /// Delegates to `inner` but fires `cancel` in the middle of each call.
    struct CancellingStore<'a> {
        inner: &'a MemoryStore,
        cancel: CancelToken,
    }

    impl SkillDictionary for CancellingStore<'_> {
        fn lookup(&self, word: &str) -> Result<Vec<SkillWeight>> {
            self.cancel.cancel();
            SkillDictionary::lookup(self.inner, word)
        }
    }

    impl SkillVectorSource for CancellingStore<'_> {
        fn fetch_all(&self) -> Result<Vec<SkillVectorRecord>> {
            self.cancel.cancel();
            self.inner.fetch_all()
        }
    }

    impl PopularitySource for CancellingStore<'_> {
        fn lookup(&self, skill: &str) -> Result<Option<f64>> {
            self.cancel.cancel();
            PopularitySource::lookup(self.inner, skill)
        }
    }

    fn assert_unavailable(err: &SmError, expected: StoreKind) {
        match err {
            SmError::CollaboratorUnavailable { store, .. } => assert_eq!(*store, expected),
            other => panic!("expected {expected} store failure, got {other:?}"),
        }
    }

    fn store() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_word_record("python", "Data Science;2.0;Django;1.0");
        store.insert_word_record("data", "Data Science;1.0");
        store.insert_skill_vector("Data Science", vec![1.0, 1.0]);
        store.insert_skill_vector("Django", vec![1.0, 0.0]);
        store.insert_popularity("django", 40175.0);
        store
    }

    fn words() -> WordVectorTable {
        let mut table = WordVectorTable::new(2);
        table.insert("python", vec![1.0, 0.0]).unwrap();
        table.insert("data", vec![0.0, 1.0]).unwrap();
        table
    }

    #[test]
    fn test_dispatches_each_strategy() {
        let store = store();
        let words = words();
        let ranker = SkillRanker::new(RankingStores::single(&store, Some(&words)));

        for strategy in Strategy::ALL {
            let outcome = ranker.rank("Python data python", strategy, 10).unwrap();
            let result = outcome.ranked().unwrap();
            assert_eq!(result.strategy, strategy);
            assert_eq!(result.skills.len(), 2);
            assert_eq!(result.matched_words, ["data", "python"]);
        }
    }

    #[test]
    fn test_lexical_worked_example() {
        let store = store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None));
        let outcome = ranker.rank("python data python", Strategy::Lexical, 10).unwrap();
        let top = &outcome.ranked().unwrap().skills[0];
        assert_eq!(top.skill, "Data Science");
        assert!((top.score - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_text_is_no_match_for_every_strategy() {
        let store = store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None));
        for strategy in Strategy::ALL {
            let outcome = ranker.rank(" -- the ", strategy, 10).unwrap();
            assert_eq!(
                outcome,
                RankingOutcome::no_match(strategy, NoMatchReason::EmptyDescription)
            );
        }
    }

    #[test]
    fn test_semantic_without_word_vectors_is_unavailable() {
        let store = store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None));
        let err = ranker.rank("python", Strategy::Semantic, 10).unwrap_err();
        assert!(matches!(
            err,
            SmError::CollaboratorUnavailable {
                store: StoreKind::WordVectors,
                ..
            }
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let store = store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None));
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = ranker
            .rank_with_cancel("python", Strategy::Lexical, 10, &cancel)
            .unwrap_err();
        assert!(matches!(err, SmError::Cancelled));
    }

    #[test]
    fn test_custom_normalizer_is_used() {
        let store = store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None))
            .with_normalizer(TextNormalizer::new().with_extra_stop_words(["python"]));
        let outcome = ranker.rank("python data", Strategy::Lexical, 10).unwrap();
        let result = outcome.ranked().unwrap();
        assert_eq!(result.matched_words, ["data"]);
        assert_eq!(result.skills.len(), 1);
    }

    #[test]
    fn test_dictionary_failure_aborts_request() {
        let down = DownStore(StoreKind::Dictionary);
        let ranker = SkillRanker::new(RankingStores::single(&down, None));
        for strategy in [Strategy::Lexical, Strategy::PopularityWeighted] {
            let err = ranker.rank("python data", strategy, 10).unwrap_err();
            assert_unavailable(&err, StoreKind::Dictionary);
        }
    }

    #[test]
    fn test_popularity_failure_after_lexical_stage_aborts_request() {
        let store = store();
        let down = DownStore(StoreKind::Popularity);
        let stores = RankingStores {
            popularity: &down,
            ..RankingStores::single(&store, None)
        };
        let ranker = SkillRanker::new(stores);

        let err = ranker
            .rank("python", Strategy::PopularityWeighted, 10)
            .unwrap_err();
        assert_unavailable(&err, StoreKind::Popularity);
        // The lexical stage alone still ranks.
        assert!(ranker.rank("python", Strategy::Lexical, 10).unwrap().ranked().is_some());
    }

    #[test]
    fn test_skill_vector_failure_aborts_semantic_request() {
        let store = store();
        let words = words();
        let down = DownStore(StoreKind::SkillVectors);
        let stores = RankingStores {
            skill_vectors: &down,
            ..RankingStores::single(&store, Some(&words))
        };
        let ranker = SkillRanker::new(stores);

        let err = ranker.rank("python data", Strategy::Semantic, 10).unwrap_err();
        assert_unavailable(&err, StoreKind::SkillVectors);
    }

    #[test]
    fn test_cancel_during_dictionary_lookup_discards_result() {
        let store = store();
        let cancel = CancelToken::new();
        let cancelling = CancellingStore {
            inner: &store,
            cancel: cancel.clone(),
        };
        let ranker = SkillRanker::new(RankingStores::single(&cancelling, None));

        for strategy in [Strategy::Lexical, Strategy::PopularityWeighted] {
            let err = ranker
                .rank_with_cancel("python data", strategy, 10, &cancel)
                .unwrap_err();
            assert!(matches!(err, SmError::Cancelled), "{strategy}: {err:?}");
        }
    }

    #[test]
    fn test_cancel_during_popularity_lookup_discards_result() {
        let store = store();
        let cancel = CancelToken::new();
        let cancelling = CancellingStore {
            inner: &store,
            cancel: cancel.clone(),
        };
        let stores = RankingStores {
            popularity: &cancelling,
            ..RankingStores::single(&store, None)
        };
        let ranker = SkillRanker::new(stores);

        let err = ranker
            .rank_with_cancel("python", Strategy::PopularityWeighted, 10, &cancel)
            .unwrap_err();
        assert!(matches!(err, SmError::Cancelled));
    }

    #[test]
    fn test_cancel_during_skill_vector_fetch_discards_result() {
        let store = store();
        let words = words();
        let cancel = CancelToken::new();
        let cancelling = CancellingStore {
            inner: &store,
            cancel: cancel.clone(),
        };
        let stores = RankingStores {
            skill_vectors: &cancelling,
            ..RankingStores::single(&store, Some(&words))
        };
        let ranker = SkillRanker::new(stores);

        let err = ranker
            .rank_with_cancel("python data", Strategy::Semantic, 10, &cancel)
            .unwrap_err();
        assert!(matches!(err, SmError::Cancelled));
        assert!(cancel.is_cancelled());
    }
}
