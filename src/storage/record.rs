//! Dictionary record parsing.
//!
//! Records store a word's skills as an alternating list
//! `skill1;weight1;skill2;weight2;...`. Bracket characters are stripped from
//! every field. A pair whose name is empty or whose weight is not a finite,
//! non-negative number is skipped; the rest of the record is still used.

use tracing::warn;

use crate::ranking::types::SkillWeight;

const BRACKETS: &[char] = &['[', ']', '{', '}', '(', ')'];

/// Parsed form of one dictionary record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecord {
    pub entries: Vec<SkillWeight>,
    /// Pairs dropped as malformed.
    pub skipped: usize,
}

/// Strip bracket characters and surrounding whitespace from a skill name.
pub fn clean_skill_name(raw: &str) -> String {
    raw.replace(BRACKETS, "").trim().to_string()
}

pub fn parse_skill_record(raw: &str) -> ParsedRecord {
    let fields: Vec<String> = raw.split(';').map(clean_skill_name).collect();
    let mut parsed = ParsedRecord::default();

    for pair in fields.chunks(2) {
        match pair {
            [name, weight] => match parse_pair(name, weight) {
                Some(entry) => parsed.entries.push(entry),
                None => {
                    warn!(skill = %name, weight = %weight, "skipping malformed dictionary entry");
                    parsed.skipped += 1;
                }
            },
            // A trailing separator leaves one empty field behind.
            [name] if name.is_empty() => {}
            [name] => {
                warn!(skill = %name, "skipping dictionary entry without a weight");
                parsed.skipped += 1;
            }
            _ => unreachable!("chunks(2) yields one or two fields"),
        }
    }

    parsed
}

fn parse_pair(name: &str, weight: &str) -> Option<SkillWeight> {
    if name.is_empty() {
        return None;
    }
    let weight = weight.parse::<f64>().ok()?;
    if !weight.is_finite() || weight < 0.0 {
        return None;
    }
    Some(SkillWeight::new(name, weight))
}

/// Inverse of [`parse_skill_record`] for well-formed entries.
pub fn format_skill_record(entries: &[SkillWeight]) -> String {
    entries
        .iter()
        .map(|entry| format!("{};{}", entry.skill, entry.weight))
        .collect::<Vec<_>>()
        .join(";")
}
