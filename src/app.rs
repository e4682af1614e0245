use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SmError};
use crate::ranking::{PopularityWeighting, RankingStores, SkillRanker};
use crate::storage::{Database, PopularitySource, WordVectorTable};

pub struct AppContext {
    pub root: PathBuf,
    pub config: Config,
    pub db: Arc<Database>,
    pub robot_mode: bool,
}

impl AppContext {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        let root = Self::find_root()?;
        let config = Config::load(cli.config.as_deref(), &root)?;
        let db_path = config.database_path(&root);
        debug!(root = %root.display(), db = %db_path.display(), "resolved skillmatch root");

        Ok(Self {
            root,
            db: Arc::new(Database::open(db_path)?),
            config,
            robot_mode: cli.robot,
        })
    }

    fn find_root() -> Result<PathBuf> {
        if let Ok(root) = std::env::var("SM_ROOT") {
            return Ok(PathBuf::from(root));
        }
        let cwd = std::env::current_dir()?;
        if let Some(found) = find_upwards(&cwd, ".skillmatch") {
            return Ok(found);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SmError::MissingConfig("data directory not found".to_string()))?;
        Ok(data_dir.join("skillmatch"))
    }

    /// Load the word vector table at the configured width.
    pub fn word_vectors(&self) -> Result<WordVectorTable> {
        self.db.load_word_vectors(self.config.embedding.dims)
    }

    /// Popularity weighting from config, optionally normalized by the store maximum.
    pub fn weighting(&self) -> Result<PopularityWeighting> {
        let weighting = self.config.weighting()?;
        if !self.config.popularity.use_store_max {
            return Ok(weighting);
        }
        match self.db.max_popularity()? {
            Some(max) if max > 0.0 => {
                PopularityWeighting::new(weighting.lambda(), max, weighting.blend())
            }
            _ => Ok(weighting),
        }
    }

    /// Ranker over the database, with config-driven normalizer and weighting.
    pub fn ranker<'a>(&'a self, word_vectors: Option<&'a WordVectorTable>) -> Result<SkillRanker<'a>> {
        Ok(
            SkillRanker::new(RankingStores::single(self.db.as_ref(), word_vectors))
                .with_normalizer(self.config.normalizer())
                .with_weighting(self.weighting()?),
        )
    }
}

fn find_upwards(start: &Path, name: &str) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(name);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
