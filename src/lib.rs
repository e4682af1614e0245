//! skillmatch - rank relevant skills for a free-text job description.
//!
//! The [`ranking`] module holds the engine; [`storage`] provides the stores
//! it reads from. Everything else is CLI plumbing.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod ranking;
pub mod storage;
pub mod test_utils;

pub use error::{Result, SmError};
pub use ranking::{RankingOutcome, RankingResult, SkillRanker, Strategy};
