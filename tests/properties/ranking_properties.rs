use proptest::prelude::*;

use skillmatch::ranking::Strategy as RankStrategy;
use skillmatch::ranking::{RankingStores, SkillAccumulator, SkillRanker, SkillWeight, top_k};
use skillmatch::test_utils::sample_store;

const SKILLS: [&str; 4] = ["Rust", "Data Science", "Django", "Systems Programming"];
const KNOWN_WORDS: [&str; 5] = ["python", "data", "pipelines", "rust", "kernel"];

fn hits() -> impl Strategy<Value = Vec<(usize, u8)>> {
    prop::collection::vec((0..SKILLS.len(), 0u8..20), 0..30)
}

fn accumulate(hits: &[(usize, u8)]) -> SkillAccumulator {
    let mut accumulator = SkillAccumulator::new();
    for (skill, weight) in hits {
        accumulator.add("word", &SkillWeight::new(SKILLS[*skill], f64::from(*weight)));
    }
    accumulator
}

proptest! {
    #[test]
    fn test_accumulator_merge_is_additive(left in hits(), right in hits()) {
        let mut merged = accumulate(&left);
        merged.merge(accumulate(&right));

        let mut combined = left.clone();
        combined.extend(right.iter().copied());
        let direct = accumulate(&combined);

        for skill in SKILLS {
            prop_assert_eq!(merged.weight(skill), direct.weight(skill));
        }
    }

    #[test]
    fn test_top_k_returns_min_k_n_sorted(
        scores in prop::collection::vec(-1000.0f64..1000.0, 0..60),
        k in 0usize..80,
    ) {
        let picked = top_k(scores.iter().copied().enumerate(), k);
        prop_assert_eq!(picked.len(), k.min(scores.len()));
        for pair in picked.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }

        let mut sorted = scores.clone();
        sorted.sort_by(|a, b| b.total_cmp(a));
        let expected: Vec<f64> = sorted.into_iter().take(k).collect();
        let actual: Vec<f64> = picked.iter().map(|(_, score)| *score).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn test_top_k_ties_keep_input_order(len in 1usize..40, k in 1usize..40) {
        let picked = top_k((0..len).map(|idx| (idx, 1.0)), k);
        let indices: Vec<usize> = picked.into_iter().map(|(idx, _)| idx).collect();
        prop_assert_eq!(indices, (0..len.min(k)).collect::<Vec<_>>());
    }

    #[test]
    fn test_padding_with_unknown_words_halves_scores(
        picks in prop::collection::vec(0..KNOWN_WORDS.len(), 1..8),
    ) {
        let store = sample_store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None));

        let words: Vec<&str> = picks.iter().map(|idx| KNOWN_WORDS[*idx]).collect();
        let text = words.join(" ");
        let padded = format!("{text} {}", vec!["zzzunknown"; words.len()].join(" "));

        let base = ranker.rank(&text, RankStrategy::Lexical, 50).unwrap().into_ranked().unwrap();
        let halved = ranker.rank(&padded, RankStrategy::Lexical, 50).unwrap().into_ranked().unwrap();

        prop_assert_eq!(base.skills.len(), halved.skills.len());
        for (full, half) in base.skills.iter().zip(&halved.skills) {
            prop_assert_eq!(&full.skill, &half.skill);
            prop_assert!((full.score / 2.0 - half.score).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ranking_never_exceeds_limit(
        picks in prop::collection::vec(0..KNOWN_WORDS.len(), 1..8),
        k in 0usize..6,
    ) {
        let store = sample_store();
        let ranker = SkillRanker::new(RankingStores::single(&store, None));
        let text = picks.iter().map(|idx| KNOWN_WORDS[*idx]).collect::<Vec<_>>().join(" ");
        for strategy in [RankStrategy::Lexical, RankStrategy::PopularityWeighted] {
            let outcome = ranker.rank(&text, strategy, k).unwrap();
            let result = outcome.into_ranked().unwrap();
            prop_assert!(result.skills.len() <= k);
        }
    }
}
