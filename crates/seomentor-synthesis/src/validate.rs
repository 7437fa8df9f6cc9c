//! Strict schema validation of synthesis output.
//!
//! Validation never invents data: a missing or malformed required field is
//! a violation, and the only repairs are reordering roadmap entries,
//! trimming strings, dropping blank list items, and normalizing competitor
//! urls.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use seomentor_core::{AnalysisArtifact, Competitor, DetailRecord, RoadmapDay};
use thiserror::Error;
use url::Url;

use crate::recover::recover_json;

pub const MIN_ISSUES: usize = 4;
pub const MIN_COMPETITORS: usize = 5;
pub const MIN_KEYWORD_GAPS: usize = 8;
pub const MAX_CHECKLIST_ITEMS: usize = 6;

static ABSOLUTE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://[^\s)]+").expect("valid url regex"));
static BARE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:[a-z0-9-]+\.)+[a-z]{2,}(?:/[^\s)]*)?").expect("valid domain regex")
});

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    /// The response held no parseable JSON object.
    #[error("response is not a JSON object: {0}")]
    Parse(String),

    /// Parsed, but a required field is missing or malformed.
    #[error("schema violation: {0}")]
    Shape(String),

    /// Shape-valid but below the specificity floor. Carries the artifact so
    /// the caller can keep it as a last-resort result.
    #[error("low quality result: {reason}")]
    LowQuality {
        artifact: Box<AnalysisArtifact>,
        shortfalls: usize,
        reason: String,
    },
}

impl Violation {
    #[must_use]
    pub fn is_hard(&self) -> bool {
        !matches!(self, Self::LowQuality { .. })
    }
}

fn shape(reason: impl Into<String>) -> Violation {
    Violation::Shape(reason.into())
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, Violation> {
    if raw.trim().is_empty() {
        return Err(Violation::Parse("empty completion".to_owned()));
    }
    match recover_json(raw) {
        Some(Value::Object(map)) => Ok(map),
        _ => Err(Violation::Parse("no recoverable JSON object".to_owned())),
    }
}

/// Parse and validate a raw analysis completion for a plan of `plan_days`.
///
/// # Errors
///
/// Returns a hard [`Violation`] for unparseable or mis-shaped output and
/// [`Violation::LowQuality`] for shape-valid output below the quality floor.
pub fn validate_analysis(raw: &str, plan_days: u32) -> Result<AnalysisArtifact, Violation> {
    let map = parse_object(raw)?;

    let seo_score = seo_score(map.get("seo_score"))?;
    let issues = string_list(&map, "issues")?;
    let competitors = competitors(&map)?;
    let keyword_gaps = string_list(&map, "keyword_gaps")?;
    let roadmap = roadmap(&map, plan_days)?;

    let artifact = AnalysisArtifact {
        seo_score,
        issues,
        competitors,
        keyword_gaps,
        roadmap,
    };

    let shortfalls = quality_shortfalls(&artifact, plan_days);
    if shortfalls.is_empty() {
        Ok(artifact)
    } else {
        Err(Violation::LowQuality {
            artifact: Box::new(artifact),
            shortfalls: shortfalls.len(),
            reason: shortfalls.join("; "),
        })
    }
}

/// Minimum distinct roadmap tasks for a plan of `plan_days`.
#[must_use]
pub fn min_distinct_tasks(plan_days: u32) -> usize {
    (plan_days as usize * 4 / 5).max(6)
}

fn quality_shortfalls(artifact: &AnalysisArtifact, plan_days: u32) -> Vec<String> {
    let mut out = Vec::new();
    if artifact.issues.len() < MIN_ISSUES {
        out.push(format!(
            "{} issues, expected at least {MIN_ISSUES}",
            artifact.issues.len()
        ));
    }
    if artifact.competitors.len() < MIN_COMPETITORS {
        out.push(format!(
            "{} competitors, expected {MIN_COMPETITORS}",
            artifact.competitors.len()
        ));
    }
    if artifact.keyword_gaps.len() < MIN_KEYWORD_GAPS {
        out.push(format!(
            "{} keyword gaps, expected at least {MIN_KEYWORD_GAPS}",
            artifact.keyword_gaps.len()
        ));
    }
    let distinct: HashSet<String> = artifact
        .roadmap
        .iter()
        .map(|d| d.task.trim().to_lowercase())
        .collect();
    let floor = min_distinct_tasks(plan_days);
    if distinct.len() < floor {
        out.push(format!(
            "{} distinct roadmap tasks, expected at least {floor}",
            distinct.len()
        ));
    }
    out
}

fn seo_score(value: Option<&Value>) -> Result<u8, Violation> {
    let score = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
        None => return Err(shape("seo_score is missing")),
    }
    .filter(|s| s.is_finite())
    .ok_or_else(|| shape("seo_score is not a number"))?;

    if !(0.0..=100.0).contains(&score) {
        return Err(shape(format!("seo_score {score} is outside 0..=100")));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(score.round() as u8)
}

fn required_array<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], Violation> {
    match map.get(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Err(shape(format!("{key} is missing"))),
        Some(_) => Err(shape(format!("{key} is not a list"))),
    }
}

fn string_list(map: &Map<String, Value>, key: &str) -> Result<Vec<String>, Violation> {
    required_array(map, key)?
        .iter()
        .enumerate()
        .filter_map(|(i, item)| match item {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| Ok(s.to_owned()))
            }
            _ => Some(Err(shape(format!("{key}[{i}] is not a string")))),
        })
        .collect()
}

fn text_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_owned()
}

fn competitors(map: &Map<String, Value>) -> Result<Vec<Competitor>, Violation> {
    let mut out = Vec::new();
    for (i, item) in required_array(map, "competitors")?.iter().enumerate() {
        let Value::Object(entry) = item else {
            return Err(shape(format!("competitors[{i}] is not an object")));
        };
        let name = text_field(entry, "name");
        if name.is_empty() {
            continue;
        }
        let reason = text_field(entry, "reason");
        let url = normalize_competitor_url(&text_field(entry, "url"))
            .or_else(|| url_in_text(&reason));
        out.push(Competitor { name, reason, url });
    }
    Ok(out)
}

fn day_number(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n.as_u64().and_then(|d| u32::try_from(d).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn roadmap(map: &Map<String, Value>, plan_days: u32) -> Result<Vec<RoadmapDay>, Violation> {
    let items = required_array(map, "roadmap")?;

    let mut days = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let Value::Object(entry) = item else {
            return Err(shape(format!("roadmap[{i}] is not an object")));
        };
        let day = day_number(entry.get("day"))
            .ok_or_else(|| shape(format!("roadmap[{i}].day is not a positive integer")))?;
        let task = text_field(entry, "task");
        if task.is_empty() {
            return Err(shape(format!("roadmap day {day} has an empty task")));
        }
        days.push(RoadmapDay { day, task });
    }

    if days.len() != plan_days as usize {
        return Err(shape(format!(
            "roadmap has {} entries, expected exactly {plan_days}",
            days.len()
        )));
    }

    days.sort_by_key(|d| d.day);
    for (expected, entry) in (1..=plan_days).zip(&days) {
        if entry.day != expected {
            return Err(shape(format!(
                "roadmap days must be exactly 1..={plan_days} with no gaps or duplicates \
                 (found day {} where day {expected} was expected)",
                entry.day
            )));
        }
    }
    Ok(days)
}

/// Normalize a competitor url: add a scheme when missing, trim trailing
/// punctuation, strip the fragment. Returns `None` for unusable input.
#[must_use]
pub fn normalize_competitor_url(raw: &str) -> Option<String> {
    let text = raw.trim().trim_end_matches([')', ',', '.', ';']);
    if text.is_empty() {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    let candidate = if let Some(rest) = text.strip_prefix("//") {
        format!("https://{rest}")
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        text.to_owned()
    } else if text.starts_with('/') || text.contains(char::is_whitespace) {
        return None;
    } else {
        format!("https://{text}")
    };

    let mut url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    // A host must look like a domain, not a single word.
    if !url.host_str().is_some_and(|h| h.contains('.')) {
        return None;
    }
    url.set_fragment(None);
    Some(url.to_string())
}

fn url_in_text(text: &str) -> Option<String> {
    ABSOLUTE_URL
        .find(text)
        .or_else(|| BARE_DOMAIN.find(text))
        .and_then(|m| normalize_competitor_url(m.as_str()))
}

/// Parse and validate a raw day-detail completion for `entry`.
///
/// # Errors
///
/// Returns a hard [`Violation`] when the output is unparseable, the
/// description or kpi is empty, or the checklist is empty.
pub fn validate_detail(raw: &str, entry: &RoadmapDay) -> Result<DetailRecord, Violation> {
    let map = parse_object(raw)?;

    let description = text_field(&map, "description");
    if description.is_empty() {
        return Err(shape("description is missing or empty"));
    }
    let kpi = text_field(&map, "kpi");
    if kpi.is_empty() {
        return Err(shape("kpi is missing or empty"));
    }
    let mut checklist = string_list(&map, "checklist")?;
    if checklist.is_empty() {
        return Err(shape("checklist is empty"));
    }
    checklist.truncate(MAX_CHECKLIST_ITEMS);

    Ok(DetailRecord {
        day: entry.day,
        task: entry.task.clone(),
        description,
        checklist,
        kpi,
    })
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
