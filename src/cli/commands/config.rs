//! skillmatch config - Show the effective configuration

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::config::Config;
use crate::error::Result;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print only the resolved database path
    #[arg(long)]
    pub database_path: bool,
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    root: String,
    database: String,
    config: &'a Config,
}

#[derive(Serialize)]
struct DatabaseReport {
    database: String,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    let database = ctx.config.database_path(&ctx.root).display().to_string();

    if ctx.robot_mode && args.database_path {
        return emit_json(&robot_ok(DatabaseReport { database }));
    }
    if ctx.robot_mode {
        return emit_json(&robot_ok(ConfigReport {
            root: ctx.root.display().to_string(),
            database,
            config: &ctx.config,
        }));
    }

    if args.database_path {
        println!("{database}");
    } else {
        print!("{}", ctx.config.to_toml_string()?);
    }
    Ok(())
}
