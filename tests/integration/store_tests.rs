use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use skillmatch::ranking::{RankingStores, SkillRanker, Strategy};
use skillmatch::storage::sqlite::{DictionaryDocument, PopularityDocument, SkillVectorDocument};
use skillmatch::storage::{Database, StoreStats, WordVectorTable};
use skillmatch::test_utils::fixtures::UnitTestFixture;
use skillmatch::test_utils::{SAMPLE_DIMS, sample_store, sample_word_vectors};

fn read<T: DeserializeOwned>(path: &Path) -> T {
    serde_json::from_str(&fs::read_to_string(path).expect("read fixture")).expect("parse fixture")
}

fn seeded_database(fixture: &UnitTestFixture) -> Database {
    let paths = fixture.write_sample_data();
    let db = Database::open(fixture.path().join("skillmatch.db")).expect("open db");
    db.import_dictionary(&read::<Vec<DictionaryDocument>>(&paths.dictionary))
        .expect("import dictionary");
    db.import_skill_vectors(
        &read::<Vec<SkillVectorDocument>>(&paths.skill_vectors),
        SAMPLE_DIMS,
    )
    .expect("import skill vectors");
    db.import_popularity(&read::<Vec<PopularityDocument>>(&paths.popularity))
        .expect("import popularity");
    let words = WordVectorTable::from_json_path(&paths.word_vectors, SAMPLE_DIMS)
        .expect("load word vectors");
    db.import_word_vectors(&words).expect("import word vectors");
    db
}

#[test]
fn test_database_stats_after_import() {
    let fixture = UnitTestFixture::new();
    let db = seeded_database(&fixture);
    assert_eq!(
        db.stats().unwrap(),
        StoreStats {
            dictionary_words: 5,
            skill_vectors: 5,
            popularity_records: 4,
            word_vectors: 5,
        }
    );
}

#[test]
fn test_database_and_memory_store_rank_identically() {
    let fixture = UnitTestFixture::new();
    let db = seeded_database(&fixture);
    let db_words = db.load_word_vectors(SAMPLE_DIMS).unwrap();
    let memory = sample_store();
    let memory_words = sample_word_vectors();

    let from_db = SkillRanker::new(RankingStores::single(&db, Some(&db_words)));
    let from_memory = SkillRanker::new(RankingStores::single(&memory, Some(&memory_words)));

    for strategy in Strategy::ALL {
        for text in ["Python data pipelines", "rust kernel", "gardening"] {
            let a = from_db.rank(text, strategy, 10).unwrap();
            let b = from_memory.rank(text, strategy, 10).unwrap();
            assert_eq!(
                a.no_match_reason(),
                b.no_match_reason(),
                "{strategy} / {text}"
            );
            let names = |outcome: &skillmatch::RankingOutcome| -> Vec<String> {
                outcome
                    .ranked()
                    .map(|r| r.skills.iter().map(|s| s.skill.clone()).collect())
                    .unwrap_or_default()
            };
            assert_eq!(names(&a), names(&b), "{strategy} / {text}");
        }
    }
}

#[test]
fn test_reopened_database_keeps_data() {
    let fixture = UnitTestFixture::new();
    let path = fixture.path().join("skillmatch.db");
    drop(seeded_database(&fixture));

    let db = Database::open(&path).unwrap();
    let ranker = SkillRanker::new(RankingStores::single(&db, None));
    let outcome = ranker.rank("rust", Strategy::Lexical, 1).unwrap();
    assert_eq!(outcome.ranked().unwrap().skills[0].skill, "Rust");
}

#[test]
fn test_skill_vectors_of_wrong_width_are_rejected() {
    let db = Database::open_in_memory().unwrap();
    let docs = vec![SkillVectorDocument {
        skill: "Rust".to_string(),
        vector: vec![1.0, 0.0],
    }];
    assert!(db.import_skill_vectors(&docs, SAMPLE_DIMS).is_err());
    assert_eq!(db.stats().unwrap().skill_vectors, 0);
}
