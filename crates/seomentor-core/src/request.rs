//! Caller-supplied analysis input and its normalization into an
//! [`AnalysisContext`].
//!
//! Everything here runs before any network call: a request that fails these
//! checks never reaches the fetcher or the generative service.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MIN_PLAN_DAYS: u32 = 7;
pub const MAX_PLAN_DAYS: u32 = 30;
/// Upper bound on priority pages, seed keywords, and known competitors.
pub const MAX_LIST_ITEMS: usize = 15;

const DEFAULT_COUNTRY: &str = "Azerbaijan";
const DEFAULT_LANGUAGE: &str = "English";
const DEFAULT_PLAN_DAYS: i64 = 30;
const DEFAULT_PRIMARY_GOAL: &str = "Increase organic traffic";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("plan_days must be between {MIN_PLAN_DAYS} and {MAX_PLAN_DAYS}, got {0}")]
    PlanDaysOutOfRange(i64),

    #[error("'{0}' is required")]
    MissingField(&'static str),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
}

/// A list field as callers send it: either a JSON array or one
/// comma/newline separated string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        Self::Items(Vec::new())
    }
}

impl From<Vec<String>> for ListInput {
    fn from(items: Vec<String>) -> Self {
        Self::Items(items)
    }
}

impl ListInput {
    /// Trimmed, non-blank items, truncated to [`MAX_LIST_ITEMS`].
    #[must_use]
    pub fn cleaned(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::Items(items) => items.iter().map(String::as_str).collect(),
            Self::Text(text) => text.split(['\n', ',']).collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .take(MAX_LIST_ITEMS)
            .map(ToOwned::to_owned)
            .collect()
    }
}

/// Untrusted analysis input.
///
/// `None` means the caller omitted the field and selects the default; an
/// explicit empty string is kept as an empty answer and, for required
/// fields, rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub plan_days: Option<i64>,
    #[serde(default)]
    pub primary_goal: Option<String>,
    #[serde(default)]
    pub business_offer: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub priority_pages: Option<ListInput>,
    #[serde(default)]
    pub seed_keywords: Option<ListInput>,
    #[serde(default)]
    pub known_competitors: Option<ListInput>,
    #[serde(default)]
    pub execution_capacity: String,
}

/// Validated, normalized analysis input. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub url: String,
    pub country: String,
    pub language: String,
    pub plan_days: u32,
    pub primary_goal: String,
    pub business_offer: String,
    /// Empty when not provided.
    pub target_audience: String,
    pub priority_pages: Vec<String>,
    pub seed_keywords: Vec<String>,
    pub known_competitors: Vec<String>,
    /// Empty when not provided.
    pub execution_capacity: String,
}

impl AnalysisRequest {
    /// Normalize and validate the request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `plan_days` is outside
    /// `MIN_PLAN_DAYS..=MAX_PLAN_DAYS`, when `url`, `primary_goal`, or
    /// `business_offer` is empty, or when the url is not an absolute
    /// http(s) URL with a host.
    pub fn into_context(self) -> Result<AnalysisContext, ValidationError> {
        let raw_days = self.plan_days.unwrap_or(DEFAULT_PLAN_DAYS);
        let plan_days = u32::try_from(raw_days)
            .ok()
            .filter(|d| (MIN_PLAN_DAYS..=MAX_PLAN_DAYS).contains(d))
            .ok_or(ValidationError::PlanDaysOutOfRange(raw_days))?;

        let url = normalize_url(&self.url)?;

        let primary_goal = self
            .primary_goal
            .as_deref()
            .map_or(DEFAULT_PRIMARY_GOAL, str::trim)
            .to_string();
        if primary_goal.is_empty() {
            return Err(ValidationError::MissingField("primary_goal"));
        }

        let business_offer = self.business_offer.trim().to_string();
        if business_offer.is_empty() {
            return Err(ValidationError::MissingField("business_offer"));
        }

        Ok(AnalysisContext {
            url,
            country: text_or_default(self.country.as_deref(), DEFAULT_COUNTRY),
            language: text_or_default(self.language.as_deref(), DEFAULT_LANGUAGE),
            plan_days,
            primary_goal,
            business_offer,
            target_audience: self.target_audience.trim().to_string(),
            priority_pages: cleaned_list(self.priority_pages.as_ref()),
            seed_keywords: cleaned_list(self.seed_keywords.as_ref()),
            known_competitors: cleaned_list(self.known_competitors.as_ref()),
            execution_capacity: self.execution_capacity.trim().to_string(),
        })
    }
}

/// Validate a notification recipient address.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] for a blank address and
/// [`ValidationError::InvalidEmail`] when it does not look like an address.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    Ok(email.to_string())
}

fn normalize_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("url"));
    }

    // Bare domains are common user input; assume https.
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&candidate).map_err(|e| ValidationError::InvalidUrl {
        url: trimmed.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::InvalidUrl {
            url: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(parsed.to_string())
}

fn text_or_default(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn cleaned_list(value: Option<&ListInput>) -> Vec<String> {
    value.map(ListInput::cleaned).unwrap_or_default()
}
