//! skillmatch import - Load ranking data into the store
//!
//! Every input is JSON:
//! - dictionary: `[{"word": "python", "skills": "[Data Science];2;Django;1"}]`
//! - skill vectors: `[{"skill": "Data Science", "vector": [0.1, ...]}]`
//! - popularity: `[{"skill": "Data Science", "average_views": 1200.0}]`
//! - word vectors: `{"python": [0.1, ...]}`

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, robot_ok};
use crate::error::{Result, SmError};
use crate::storage::{WordVectorTable, parse_skill_record};
use crate::storage::sqlite::{DictionaryDocument, PopularityDocument, SkillVectorDocument};

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("sources")
        .required(true)
        .multiple(true)
        .args(["dictionary", "skill_vectors", "popularity", "word_vectors"])
))]
pub struct ImportArgs {
    /// Word to skill record dictionary
    #[arg(long, value_name = "PATH")]
    pub dictionary: Option<PathBuf>,

    /// Skill embeddings
    #[arg(long, value_name = "PATH")]
    pub skill_vectors: Option<PathBuf>,

    /// Skill popularity counts
    #[arg(long, value_name = "PATH")]
    pub popularity: Option<PathBuf>,

    /// Word embeddings
    #[arg(long, value_name = "PATH")]
    pub word_vectors: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_vectors: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popularity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_vectors: Option<usize>,
}

pub fn run(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let mut warnings = Vec::new();
    let report = import_all(ctx, args, &mut warnings)?;
    if ctx.robot_mode {
        return emit_json(&robot_ok(&report).with_warnings(warnings));
    }

    let mut layout = HumanLayout::new();
    layout.title("Import");
    let rows = [
        ("Dictionary words", report.dictionary),
        ("Skill vectors", report.skill_vectors),
        ("Popularity", report.popularity),
        ("Word vectors", report.word_vectors),
    ];
    for (label, count) in rows {
        if let Some(count) = count {
            layout.kv(label, &count.to_string());
        }
    }
    if !warnings.is_empty() {
        layout.blank().section("Warnings");
        for warning in &warnings {
            layout.bullet(warning);
        }
    }
    emit_human(layout);
    Ok(())
}

fn import_all(
    ctx: &AppContext,
    args: &ImportArgs,
    warnings: &mut Vec<String>,
) -> Result<ImportReport> {
    let dims = ctx.config.embedding.dims;
    let mut report = ImportReport::default();

    if let Some(path) = &args.dictionary {
        let docs: Vec<DictionaryDocument> = read_json(path)?;
        warnings.extend(malformed_record_warnings(&docs));
        let count = ctx.db.import_dictionary(&docs)?;
        info!(path = %path.display(), count, "imported dictionary");
        report.dictionary = Some(count);
    }
    if let Some(path) = &args.skill_vectors {
        let docs: Vec<SkillVectorDocument> = read_json(path)?;
        let count = ctx.db.import_skill_vectors(&docs, dims)?;
        info!(path = %path.display(), count, "imported skill vectors");
        report.skill_vectors = Some(count);
    }
    if let Some(path) = &args.popularity {
        let docs: Vec<PopularityDocument> = read_json(path)?;
        let count = ctx.db.import_popularity(&docs)?;
        info!(path = %path.display(), count, "imported popularity");
        report.popularity = Some(count);
    }
    if let Some(path) = &args.word_vectors {
        let table = WordVectorTable::from_json_path(path, dims)?;
        let count = ctx.db.import_word_vectors(&table)?;
        report.word_vectors = Some(count);
    }
    Ok(report)
}

/// Records are stored raw; pairs the ranker will skip are reported up front.
fn malformed_record_warnings(docs: &[DictionaryDocument]) -> Vec<String> {
    docs.iter()
        .filter_map(|doc| {
            let skipped = parse_skill_record(&doc.skills).skipped;
            (skipped > 0).then(|| {
                format!(
                    "dictionary word {}: {skipped} malformed skill/weight pair(s) will be ignored",
                    doc.word
                )
            })
        })
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|err| SmError::InvalidInput(format!("{}: {err}", path.display())))
}
