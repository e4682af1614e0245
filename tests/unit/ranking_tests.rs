use skillmatch::ranking::{
    BlendPolicy, NoMatchReason, PopularityWeighting, RankingOutcome, RankingStores, SkillRanker,
    Strategy,
};
use skillmatch::storage::MemoryStore;
use skillmatch::test_utils::{TestCase, round6, sample_store, sample_word_vectors};

fn ranked_names(outcome: &RankingOutcome) -> Vec<String> {
    outcome
        .ranked()
        .map(|result| result.skills.iter().map(|s| s.skill.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn lexical_worked_example_scores_five_sixths() {
    let store = MemoryStore::new();
    store.insert_word_record("python", "data science;2.0");
    store.insert_word_record("data", "data science;1.0");
    let ranker = SkillRanker::new(RankingStores::single(&store, None));

    let outcome = ranker.rank("python data python", Strategy::Lexical, 10).unwrap();
    let result = outcome.ranked().unwrap();
    assert_eq!(result.skills.len(), 1);
    assert_eq!(result.skills[0].skill, "data science");
    assert!((result.skills[0].score - 5.0 / 6.0).abs() < 1e-9);
    assert_eq!(result.matched_words, vec!["data", "python"]);
}

#[test]
fn lexical_limit_larger_than_candidates_returns_all() {
    let store = sample_store();
    let ranker = SkillRanker::new(RankingStores::single(&store, None));
    let outcome = ranker.rank("Python data pipelines", Strategy::Lexical, 10).unwrap();
    assert_eq!(
        ranked_names(&outcome),
        vec!["Data Engineering", "Data Science", "Django"]
    );
}

#[test]
fn lexical_scores_table() -> Result<(), String> {
    let store = sample_store();
    let ranker = SkillRanker::new(RankingStores::single(&store, None));
    let cases = vec![
        TestCase {
            name: "three words",
            input: "Python data pipelines",
            expected: vec![
                ("Data Engineering".to_string(), 0.583_333),
                ("Data Science".to_string(), 0.5),
                ("Django".to_string(), 0.333_333),
            ],
        },
        TestCase {
            name: "stop words and punctuation ignored",
            input: "The Rust/kernel team.",
            expected: vec![
                ("Rust".to_string(), 1.0),
                ("Systems Programming".to_string(), 0.5),
            ],
        },
        TestCase {
            name: "ties keep record order",
            input: "python",
            expected: vec![
                ("Data Science".to_string(), 1.0),
                ("Django".to_string(), 1.0),
            ],
        },
    ];

    run_cases(&ranker, cases)
}

fn run_cases(
    ranker: &SkillRanker<'_>,
    cases: Vec<TestCase<&'static str, Vec<(String, f64)>>>,
) -> Result<(), String> {
    skillmatch::test_utils::run_table_tests(cases, |text| {
        ranker
            .rank(text, Strategy::Lexical, 10)
            .unwrap()
            .ranked()
            .map(|result| {
                result
                    .skills
                    .iter()
                    .map(|s| (s.skill.clone(), round6(s.score)))
                    .collect()
            })
            .unwrap_or_default()
    })
}

#[test]
fn popularity_reorders_lexical_candidates() {
    let store = sample_store();
    let ranker = SkillRanker::new(RankingStores::single(&store, None));
    let outcome = ranker
        .rank("Python data pipelines", Strategy::PopularityWeighted, 10)
        .unwrap();
    assert_eq!(
        ranked_names(&outcome),
        vec!["Data Science", "Data Engineering", "Django"]
    );
}

#[test]
fn popularity_zero_collapses_under_multiplicative_blend() {
    let store = MemoryStore::new();
    store.insert_word_record("rust", "Rust;1.0");
    store.insert_popularity("Rust", 0.0);
    let ranker = SkillRanker::new(RankingStores::single(&store, None));

    let outcome = ranker.rank("rust", Strategy::PopularityWeighted, 5).unwrap();
    let result = outcome.ranked().unwrap();
    assert_eq!(result.skills.len(), 1);
    assert_eq!(result.skills[0].score, 0.0);
}

#[test]
fn popularity_linear_blend_keeps_relevance() {
    let store = MemoryStore::new();
    store.insert_word_record("rust", "Rust;1.0");
    store.insert_popularity("Rust", 0.0);
    let weighting = PopularityWeighting::new(0.5, 40175.0, BlendPolicy::Linear).unwrap();
    let ranker = SkillRanker::new(RankingStores::single(&store, None)).with_weighting(weighting);

    let outcome = ranker.rank("rust", Strategy::PopularityWeighted, 5).unwrap();
    assert!((outcome.ranked().unwrap().skills[0].score - 0.5).abs() < 1e-12);
}

#[test]
fn semantic_ranks_by_cosine_similarity() {
    let store = sample_store();
    let words = sample_word_vectors();
    let ranker = SkillRanker::new(RankingStores::single(&store, Some(&words)));

    let outcome = ranker.rank("rust kernel", Strategy::Semantic, 2).unwrap();
    let result = outcome.ranked().unwrap();
    assert_eq!(
        ranked_names(&outcome),
        vec!["Systems Programming", "Rust"]
    );
    assert!(result.skills.iter().all(|s| s.score <= 1.0));
    assert!(result.skills.iter().all(|s| s.contributing_words.is_empty()));
    assert_eq!(result.matched_words, vec!["kernel", "rust"]);
}

#[test]
fn no_match_reasons() -> Result<(), String> {
    let store = sample_store();
    let words = sample_word_vectors();
    let ranker = SkillRanker::new(RankingStores::single(&store, Some(&words)));
    let cases = vec![
        TestCase {
            name: "only stop words",
            input: ("the and of", Strategy::Lexical),
            expected: Some(NoMatchReason::EmptyDescription),
        },
        TestCase {
            name: "unknown words",
            input: ("gardening cooking", Strategy::Lexical),
            expected: Some(NoMatchReason::NoDictionaryMatches),
        },
        TestCase {
            name: "unknown words popularity",
            input: ("gardening", Strategy::PopularityWeighted),
            expected: Some(NoMatchReason::NoDictionaryMatches),
        },
        TestCase {
            name: "no embeddings",
            input: ("gardening", Strategy::Semantic),
            expected: Some(NoMatchReason::NoKnownEmbeddings),
        },
        TestCase {
            name: "ranked",
            input: ("rust", Strategy::Semantic),
            expected: None,
        },
    ];

    skillmatch::test_utils::run_table_tests(cases, |(text, strategy)| {
        ranker.rank(text, strategy, 5).unwrap().no_match_reason()
    })
}

#[test]
fn zero_limit_returns_empty_ranking() {
    let store = sample_store();
    let ranker = SkillRanker::new(RankingStores::single(&store, None));
    let outcome = ranker.rank("python", Strategy::Lexical, 0).unwrap();
    let result = outcome.ranked().unwrap();
    assert!(result.skills.is_empty());
    assert_eq!(result.matched_words, vec!["python"]);
}
