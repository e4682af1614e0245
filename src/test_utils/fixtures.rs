use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use super::{
    SAMPLE_DICTIONARY, SAMPLE_DIMS, SAMPLE_POPULARITY, SAMPLE_SKILL_VECTORS, SAMPLE_WORD_VECTORS,
};

/// Paths of the JSON import files written by [`UnitTestFixture::write_sample_data`].
#[derive(Debug, Clone)]
pub struct SampleDataPaths {
    pub dictionary: PathBuf,
    pub skill_vectors: PathBuf,
    pub popularity: PathBuf,
    pub word_vectors: PathBuf,
}

/// Isolated skillmatch root in a temp directory.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for UnitTestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitTestFixture {
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().join(".skillmatch");
        std::fs::create_dir_all(&root).expect("Failed to create root");
        println!("[FIXTURE] Created skillmatch root: {root:?}");
        Self { temp_dir, root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create a file under the root.
    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        println!(
            "[FIXTURE] Created file: {:?} ({} bytes)",
            full_path,
            content.len()
        );
        full_path
    }

    /// Project config sized for the sample vectors.
    pub fn write_config(&self, extra: &str) -> PathBuf {
        let content = format!("[embedding]\ndims = {SAMPLE_DIMS}\n\n{extra}");
        self.create_file("config.toml", &content)
    }

    /// Write the sample data set as import-ready JSON.
    pub fn write_sample_data(&self) -> SampleDataPaths {
        let dictionary: Vec<Value> = SAMPLE_DICTIONARY
            .iter()
            .map(|(word, skills)| json!({ "word": word, "skills": skills }))
            .collect();
        let skill_vectors: Vec<Value> = SAMPLE_SKILL_VECTORS
            .iter()
            .map(|(skill, vector)| json!({ "skill": skill, "vector": vector }))
            .collect();
        let popularity: Vec<Value> = SAMPLE_POPULARITY
            .iter()
            .map(|(skill, views)| json!({ "skill": skill, "average_views": views }))
            .collect();
        let word_vectors: Map<String, Value> = SAMPLE_WORD_VECTORS
            .iter()
            .map(|(word, vector)| ((*word).to_string(), json!(vector)))
            .collect();

        SampleDataPaths {
            dictionary: self.create_json("data/dictionary.json", &Value::from(dictionary)),
            skill_vectors: self.create_json("data/skill_vectors.json", &Value::from(skill_vectors)),
            popularity: self.create_json("data/popularity.json", &Value::from(popularity)),
            word_vectors: self.create_json("data/word_vectors.json", &Value::Object(word_vectors)),
        }
    }

    fn create_json(&self, relative_path: &str, value: &Value) -> PathBuf {
        let content = serde_json::to_string_pretty(value).expect("Failed to encode fixture");
        self.create_file(relative_path, &content)
    }
}

impl Drop for UnitTestFixture {
    fn drop(&mut self) {
        println!("[FIXTURE] Cleaning up temp directory: {:?}", self.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::WordVectorTable;

    #[test]
    fn test_sample_word_vectors_load_at_sample_width() {
        let fixture = UnitTestFixture::new();
        let paths = fixture.write_sample_data();
        let table = WordVectorTable::from_json_path(&paths.word_vectors, SAMPLE_DIMS).unwrap();
        assert_eq!(table.len(), SAMPLE_WORD_VECTORS.len());
        assert!(paths.dictionary.exists());
    }
}
