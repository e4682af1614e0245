//! skillmatch rank - Rank skills for a job description

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tracing::info;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, emit_human, emit_json, format_score, robot_ok};
use crate::error::{Result, SmError};
use crate::ranking::{BlendPolicy, PopularityWeighting, RankingOutcome, Strategy};

#[derive(Args, Debug)]
pub struct RankArgs {
    /// Description text ("-" or omitted reads stdin)
    #[arg(conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the description from a file
    #[arg(long, short, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Strategy: lexical, semantic, popularity
    #[arg(long, short)]
    pub strategy: Option<String>,

    /// Maximum number of skills returned
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Popularity weight in [0, 1]
    #[arg(long)]
    pub lambda: Option<f64>,

    /// Popularity blend: multiplicative or linear
    #[arg(long)]
    pub blend: Option<String>,
}

#[derive(Serialize)]
struct RankReport<'a> {
    limit: usize,
    #[serde(flatten)]
    outcome: &'a RankingOutcome,
}

pub fn run(ctx: &AppContext, args: &RankArgs) -> Result<()> {
    let text = read_description(args)?;
    let strategy = match args.strategy.as_deref() {
        Some(raw) => parse_strategy(raw)?,
        None => ctx.config.strategy()?,
    };
    let limit = args.limit.unwrap_or(ctx.config.ranking.top_k);

    // The embedding table is large; only semantic requests pay for it.
    let word_vectors = if strategy == Strategy::Semantic {
        Some(ctx.word_vectors()?)
    } else {
        None
    };

    let weighting = override_weighting(ctx.weighting()?, args.lambda, args.blend.as_deref())?;
    let ranker = ctx.ranker(word_vectors.as_ref())?.with_weighting(weighting);
    let outcome = ranker.rank(&text, strategy, limit)?;

    match &outcome {
        RankingOutcome::Ranked(result) => {
            info!(strategy = %strategy, skills = result.skills.len(), "ranked description");
        }
        RankingOutcome::NoMatch { reason, .. } => {
            info!(strategy = %strategy, reason = %reason, "no match");
        }
    }

    if ctx.robot_mode {
        emit_json(&robot_ok(RankReport {
            limit,
            outcome: &outcome,
        }))
    } else {
        emit_human(render_outcome(&outcome));
        Ok(())
    }
}

fn read_description(args: &RankArgs) -> Result<String> {
    if let Some(path) = &args.file {
        return Ok(std::fs::read_to_string(path)?);
    }
    match args.text.as_deref() {
        Some("-") | None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        Some(text) => Ok(text.to_string()),
    }
}

fn parse_strategy(raw: &str) -> Result<Strategy> {
    raw.parse::<Strategy>().map_err(|_| {
        SmError::InvalidInput(format!(
            "unknown strategy {raw} (expected lexical|semantic|popularity)"
        ))
    })
}

fn override_weighting(
    base: PopularityWeighting,
    lambda: Option<f64>,
    blend: Option<&str>,
) -> Result<PopularityWeighting> {
    if lambda.is_none() && blend.is_none() {
        return Ok(base);
    }
    let blend = match blend {
        Some(raw) => raw
            .parse::<BlendPolicy>()
            .map_err(|err| SmError::InvalidInput(err.to_string()))?,
        None => base.blend(),
    };
    PopularityWeighting::new(
        lambda.unwrap_or_else(|| base.lambda()),
        base.max_popularity(),
        blend,
    )
    .map_err(|err| SmError::InvalidInput(err.to_string()))
}

fn render_outcome(outcome: &RankingOutcome) -> HumanLayout {
    let mut layout = HumanLayout::new();
    match outcome {
        RankingOutcome::NoMatch { strategy, reason } => {
            layout
                .title(&format!("Skills ({strategy})"))
                .push_line(format!("No match: {reason}"));
        }
        RankingOutcome::Ranked(result) => {
            layout.title(&format!("Skills ({})", result.strategy));
            for (idx, skill) in result.skills.iter().enumerate() {
                let mut line = format!(
                    "{:>3}. {:<32} {}",
                    idx + 1,
                    skill.skill,
                    format_score(skill.score)
                );
                if !skill.contributing_words.is_empty() {
                    let words: Vec<&str> =
                        skill.contributing_words.iter().map(String::as_str).collect();
                    line.push_str(&format!("  [{}]", words.join(", ")));
                }
                layout.push_line(line);
            }
            if !result.matched_words.is_empty() {
                layout
                    .blank()
                    .kv("Matched words", &result.matched_words.join(" "));
            }
        }
    }
    layout
}
