//! Shared test utilities for skillmatch.

pub mod fixtures;

use crate::storage::{MemoryStore, WordVectorTable};

/// Width of the vectors in [`sample_store`] and the JSON fixtures.
pub const SAMPLE_DIMS: usize = 3;

/// Table-driven test case structure.
#[derive(Debug, Clone)]
pub struct TestCase<I, E> {
    pub name: &'static str,
    pub input: I,
    pub expected: E,
}

/// Run table-driven tests, printing input, output, and timing per case.
pub fn run_table_tests<I, E, F>(cases: Vec<TestCase<I, E>>, test_fn: F) -> Result<(), String>
where
    I: std::fmt::Debug + Clone,
    E: std::fmt::Debug + PartialEq,
    F: Fn(I) -> E,
{
    let mut failures = Vec::new();
    for case in cases {
        let start = std::time::Instant::now();
        println!("[TEST] Running: {}", case.name);
        println!("[TEST] Input: {:?}", case.input);

        let actual = test_fn(case.input.clone());
        println!("[TEST] Expected: {:?}", case.expected);
        println!("[TEST] Actual: {actual:?}");
        println!("[TEST] Timing: {:?}", start.elapsed());

        if actual == case.expected {
            println!("[TEST] PASSED: {}\n", case.name);
        } else {
            failures.push(format!(
                "'{}': expected {:?}, got {:?}",
                case.name, case.expected, actual
            ));
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("\n"))
    }
}

/// Round to six decimals so float scores compare in tables.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Small in-memory store covering every strategy.
///
/// Skills: Data Science, Django, Data Engineering, Rust, Systems Programming.
pub fn sample_store() -> MemoryStore {
    let store = MemoryStore::new();
    for (word, record) in SAMPLE_DICTIONARY {
        store.insert_word_record(word, record);
    }
    for (skill, vector) in SAMPLE_SKILL_VECTORS {
        store.insert_skill_vector(skill, vector.to_vec());
    }
    for (skill, views) in SAMPLE_POPULARITY {
        store.insert_popularity(skill, views);
    }
    store
}

/// Word embeddings matching [`sample_store`].
pub fn sample_word_vectors() -> WordVectorTable {
    let mut table = WordVectorTable::new(SAMPLE_DIMS);
    for (word, vector) in SAMPLE_WORD_VECTORS {
        table
            .insert(word, vector.to_vec())
            .expect("sample vectors have the sample width");
    }
    table
}

pub const SAMPLE_DICTIONARY: [(&str, &str); 5] = [
    ("python", "[Data Science];2.0;Django;1.0"),
    ("data", "Data Science;1.0;Data Engineering;1.5"),
    ("pipelines", "Data Engineering;2.0"),
    ("rust", "Rust;3.0;Systems Programming;1.0"),
    ("kernel", "Systems Programming;2.0"),
];

pub const SAMPLE_SKILL_VECTORS: [(&str, [f32; SAMPLE_DIMS]); 5] = [
    ("Data Science", [1.0, 0.2, 0.0]),
    ("Django", [0.6, 0.8, 0.0]),
    ("Data Engineering", [0.8, 0.0, 0.3]),
    ("Rust", [0.0, 0.1, 1.0]),
    ("Systems Programming", [0.0, 0.3, 0.9]),
];

pub const SAMPLE_WORD_VECTORS: [(&str, [f32; SAMPLE_DIMS]); 5] = [
    ("python", [0.9, 0.4, 0.0]),
    ("data", [1.0, 0.0, 0.1]),
    ("pipelines", [0.7, 0.0, 0.4]),
    ("rust", [0.0, 0.0, 1.0]),
    ("kernel", [0.0, 0.4, 0.8]),
];

pub const SAMPLE_POPULARITY: [(&str, f64); 4] = [
    ("Data Science", 4000.0),
    ("Django", 1000.0),
    ("Data Engineering", 2000.0),
    ("Rust", 0.0),
];
