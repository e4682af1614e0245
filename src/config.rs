use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SmError};
use crate::ranking::popularity::{DEFAULT_LAMBDA, DEFAULT_MAX_POPULARITY};
use crate::ranking::{
    BlendPolicy, DEFAULT_EMBEDDING_DIMS, DEFAULT_TOP_K, PopularityWeighting, Strategy,
    TextNormalizer,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub popularity: PopularityConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SM_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(SmError::MissingConfig(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let patch: ConfigPatch =
            toml::from_str(raw).map_err(|err| SmError::Config(format!("parse config: {err}")))?;
        let mut config = Self::default();
        config.merge_patch(patch);
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|err| SmError::Serialization(format!("serialize config: {err}")))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("skillmatch/config.toml"))
    }

    fn load_project(root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&root.join("config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SmError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SmError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.ranking {
            self.ranking.merge(patch);
        }
        if let Some(patch) = patch.popularity {
            self.popularity.merge(patch);
        }
        if let Some(patch) = patch.embedding {
            self.embedding.merge(patch);
        }
        if let Some(patch) = patch.normalizer {
            self.normalizer.merge(patch);
        }
        if let Some(patch) = patch.store {
            self.store.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SM_RANKING_STRATEGY") {
            self.ranking.default_strategy = value;
        }
        if let Some(value) = env_usize("SM_RANKING_TOP_K")? {
            self.ranking.top_k = value;
        }

        if let Some(value) = env_f64("SM_POPULARITY_LAMBDA")? {
            self.popularity.lambda = value;
        }
        if let Some(value) = env_f64("SM_POPULARITY_MAX")? {
            self.popularity.max_popularity = value;
        }
        if let Some(value) = env_string("SM_POPULARITY_BLEND") {
            self.popularity.blend = value;
        }
        if let Some(value) = env_bool("SM_POPULARITY_USE_STORE_MAX") {
            self.popularity.use_store_max = value;
        }

        if let Some(value) = env_usize("SM_EMBEDDING_DIMS")? {
            self.embedding.dims = value;
        }

        if let Some(values) = env_list("SM_STOP_WORDS") {
            self.normalizer.extra_stop_words =
                merge_unique(values, &self.normalizer.extra_stop_words);
        }

        if let Some(value) = env_string("SM_DATABASE") {
            self.store.database = value;
        }

        Ok(())
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.strategy()?;
        self.blend()?;
        self.weighting()?;
        if self.embedding.dims == 0 {
            return Err(SmError::Config("embedding dims must be positive".to_string()));
        }
        if self.store.database.trim().is_empty() {
            return Err(SmError::Config("store database must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn strategy(&self) -> Result<Strategy> {
        self.ranking.default_strategy.parse()
    }

    pub fn blend(&self) -> Result<BlendPolicy> {
        self.popularity.blend.parse()
    }

    pub fn weighting(&self) -> Result<PopularityWeighting> {
        PopularityWeighting::new(
            self.popularity.lambda,
            self.popularity.max_popularity,
            self.blend()?,
        )
    }

    pub fn normalizer(&self) -> TextNormalizer {
        TextNormalizer::new().with_extra_stop_words(&self.normalizer.extra_stop_words)
    }

    pub fn database_path(&self, root: &Path) -> PathBuf {
        let path = PathBuf::from(&self.store.database);
        if path.is_absolute() {
            path
        } else {
            root.join(path)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default)]
    pub default_strategy: String,
    #[serde(default)]
    pub top_k: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_strategy: Strategy::Lexical.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl RankingConfig {
    fn merge(&mut self, patch: RankingPatch) {
        if let Some(value) = patch.default_strategy {
            self.default_strategy = value;
        }
        if let Some(value) = patch.top_k {
            self.top_k = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopularityConfig {
    #[serde(default)]
    pub lambda: f64,
    #[serde(default)]
    pub max_popularity: f64,
    #[serde(default)]
    pub blend: String,
    /// Take the normalization constant from the popularity store instead of
    /// `max_popularity` when the store can report one.
    #[serde(default)]
    pub use_store_max: bool,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            lambda: DEFAULT_LAMBDA,
            max_popularity: DEFAULT_MAX_POPULARITY,
            blend: BlendPolicy::Multiplicative.to_string(),
            use_store_max: false,
        }
    }
}

impl PopularityConfig {
    fn merge(&mut self, patch: PopularityPatch) {
        if let Some(value) = patch.lambda {
            self.lambda = value;
        }
        if let Some(value) = patch.max_popularity {
            self.max_popularity = value;
        }
        if let Some(value) = patch.blend {
            self.blend = value;
        }
        if let Some(value) = patch.use_store_max {
            self.use_store_max = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub dims: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dims: DEFAULT_EMBEDDING_DIMS,
        }
    }
}

impl EmbeddingConfig {
    fn merge(&mut self, patch: EmbeddingPatch) {
        if let Some(value) = patch.dims {
            self.dims = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizerConfig {
    #[serde(default)]
    pub extra_stop_words: Vec<String>,
}

impl NormalizerConfig {
    fn merge(&mut self, patch: NormalizerPatch) {
        if let Some(values) = patch.extra_stop_words {
            self.extra_stop_words = merge_unique(values, &self.extra_stop_words);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file, relative to the skillmatch root unless absolute.
    #[serde(default)]
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: "skillmatch.db".to_string(),
        }
    }
}

impl StoreConfig {
    fn merge(&mut self, patch: StorePatch) {
        if let Some(value) = patch.database {
            self.database = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub ranking: Option<RankingPatch>,
    pub popularity: Option<PopularityPatch>,
    pub embedding: Option<EmbeddingPatch>,
    pub normalizer: Option<NormalizerPatch>,
    pub store: Option<StorePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RankingPatch {
    pub default_strategy: Option<String>,
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PopularityPatch {
    pub lambda: Option<f64>,
    pub max_popularity: Option<f64>,
    pub blend: Option<String>,
    pub use_store_max: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EmbeddingPatch {
    pub dims: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct NormalizerPatch {
    pub extra_stop_words: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StorePatch {
    pub database: Option<String>,
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values.into_iter().chain(existing.iter().cloned()) {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|err| SmError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|err| SmError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    })
}
