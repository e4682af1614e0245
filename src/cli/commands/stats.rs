//! skillmatch stats - Show store contents

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, format_score, robot_ok};
use crate::error::Result;
use crate::storage::{PopularitySource, StoreStats};

#[derive(Args, Debug)]
pub struct StatsArgs {}

#[derive(Serialize)]
struct StatsReport {
    database: String,
    schema_version: u32,
    #[serde(flatten)]
    counts: StoreStats,
    max_popularity: Option<f64>,
}

pub fn run(ctx: &AppContext, _args: &StatsArgs) -> Result<()> {
    let report = StatsReport {
        database: ctx
            .db
            .path()
            .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string()),
        schema_version: ctx.db.schema_version(),
        counts: ctx.db.stats()?,
        max_popularity: ctx.db.max_popularity()?,
    };

    if ctx.robot_mode {
        return emit_json(&robot_ok(report));
    }

    let mut layout = HumanLayout::new();
    layout
        .title("Store")
        .kv("Database", &report.database)
        .kv("Schema version", &report.schema_version.to_string())
        .blank()
        .section("Rows")
        .kv("Dictionary words", &report.counts.dictionary_words.to_string())
        .kv("Skill vectors", &report.counts.skill_vectors.to_string())
        .kv("Popularity", &report.counts.popularity_records.to_string())
        .kv("Word vectors", &report.counts.word_vectors.to_string())
        .blank()
        .kv(
            "Max popularity",
            &report
                .max_popularity
                .map_or_else(|| "-".to_string(), format_score),
        );
    emit_human(layout);
    Ok(())
}
