//! Prompt text for analysis and day-detail synthesis.

use std::fmt::Write as _;

use seomentor_core::{AnalysisContext, PageSignals, Project, RoadmapDay};

pub const ANALYSIS_SYSTEM_PROMPT: &str = "You are a senior international SEO strategist.
Return ONLY valid raw JSON that matches the schema exactly.
Recommendations must be specific to the provided URL, country, language, and scraped metrics.
Avoid generic advice and repeated actions.
Do not include markdown, code fences, or text outside JSON.";

pub const DETAIL_SYSTEM_PROMPT: &str = "You are an expert SEO execution coach.
Return only valid raw JSON.
Do not include markdown fences or any text outside JSON.";

const NOT_PROVIDED: &str = "Not provided";

fn text_or_placeholder(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        NOT_PROVIDED
    } else {
        trimmed
    }
}

fn list_or_placeholder(values: &[String]) -> String {
    if values.is_empty() {
        NOT_PROVIDED.to_owned()
    } else {
        values.join(", ")
    }
}

fn analysis_shape(plan_days: u32) -> String {
    format!(
        r#"{{
  "seo_score": number,
  "issues": ["string"],
  "competitors": [
    {{ "name": "string", "reason": "string", "url": "string" }}
  ],
  "keyword_gaps": ["string"],
  "roadmap": [
    {{ "day": 1, "task": "string" }}
  ]
}}
The roadmap must contain exactly {plan_days} entries with day values 1 through {plan_days}, each once."#
    )
}

/// Build the primary analysis prompt. Every signal and context field is
/// embedded verbatim; empty optional fields render as `Not provided`.
#[must_use]
pub fn build_analysis_prompt(signals: &PageSignals, ctx: &AnalysisContext) -> String {
    let plan_days = ctx.plan_days;
    format!(
        "Website URL: {url}
Country: {country}
Language: {language}

Onboarding Context:
Primary Goal: {goal}
Business / Offer: {offer}
Target Audience: {audience}
Priority Pages: {pages}
Seed Keywords: {keywords}
Known Competitors: {known}
Execution Capacity: {capacity}

Extracted SEO Data:
Title: {title}
Meta Description: {meta}
H1 Count: {h1}
H2 Count: {h2}
Word Count: {words}
Internal Links: {links}
Images Missing Alt: {alt}

Tasks:
0. Tailor every recommendation to the onboarding context above when available.
1. Generate an SEO score between 0 and 100.
2. List key SEO issues using this string format:
   \"<Issue> | Evidence: <metric/page signal> | Impact: <why rankings suffer> | Fix: <exact action>\".
3. Identify exactly 5 realistic competitors operating in this country/language.
   Include a clickable \"url\" and in \"reason\" explain why they directly compete.
4. Identify 10-15 keyword/content gaps with strong search intent in this country/language.
5. Generate exactly {plan_days} unique roadmap tasks (day 1..{plan_days}).
   Every task must include a concrete page/asset target and a KPI.
6. Avoid filler tasks like \"develop strategy\" without specifics.
7. Do not use unescaped double quotes inside any JSON string value.
8. Do not wrap keywords in double quotes; use plain words or single quotes.

Return ONLY this JSON structure:

{shape}

No additional text.",
        url = ctx.url,
        country = ctx.country,
        language = ctx.language,
        goal = text_or_placeholder(&ctx.primary_goal),
        offer = text_or_placeholder(&ctx.business_offer),
        audience = text_or_placeholder(&ctx.target_audience),
        pages = list_or_placeholder(&ctx.priority_pages),
        keywords = list_or_placeholder(&ctx.seed_keywords),
        known = list_or_placeholder(&ctx.known_competitors),
        capacity = text_or_placeholder(&ctx.execution_capacity),
        title = signals.title,
        meta = signals.meta_description,
        h1 = signals.h1_count,
        h2 = signals.h2_count,
        words = signals.word_count,
        links = signals.internal_link_count,
        alt = signals.missing_alt_image_count,
        shape = analysis_shape(plan_days),
    )
}

/// Instruction appended after a hard violation. Restates the exact shape.
#[must_use]
pub fn shape_retry_instruction(plan_days: u32, reason: &str, truncated: bool) -> String {
    let mut out = format!(
        "

Previous output was rejected: {reason}
Regenerate complete strict JSON only, in exactly this shape:
{shape}
- issues: 4-5 items, each concise.
- competitors: exactly 5.
- keyword_gaps: at least 10 short phrases.
- roadmap: exactly {plan_days} tasks, days 1..{plan_days}, each <= 14 words.
- ensure all JSON brackets and braces are closed.
- never use double quotes inside string values; use plain words or single quotes.
No text outside JSON.",
        shape = analysis_shape(plan_days),
    );
    if truncated {
        out.push_str("\nKeep every value short to avoid truncation.");
    }
    out
}

/// Instruction appended after a shape-valid but low-quality result.
#[must_use]
pub fn quality_retry_instruction(plan_days: u32, reason: &str) -> String {
    format!(
        "

Previous output was too generic ({reason}).
Regenerate now with stricter specificity.
Rules: do not repeat tasks, include concrete page/asset targets, include KPI in every roadmap task, \
ensure competitors are realistic for the country/language, and output exactly {plan_days} roadmap days."
    )
}

const DETAIL_ISSUES: usize = 4;
const DETAIL_KEYWORD_GAPS: usize = 6;
const DETAIL_COMPETITORS: usize = 4;

fn bullet_list(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        NOT_PROVIDED.to_owned()
    } else {
        items.join("; ")
    }
}

/// Build the day-detail prompt for `entry` of `project`.
#[must_use]
pub fn build_detail_prompt(project: &Project, entry: &RoadmapDay) -> String {
    let ctx = &project.context;
    let artifact = &project.artifact;

    let issues = bullet_list(artifact.issues.iter().take(DETAIL_ISSUES).cloned());
    let gaps = bullet_list(artifact.keyword_gaps.iter().take(DETAIL_KEYWORD_GAPS).cloned());
    let competitors = bullet_list(
        artifact
            .competitors
            .iter()
            .take(DETAIL_COMPETITORS)
            .map(|c| c.name.clone()),
    );

    let mut out = String::from(
        r#"Return ONLY valid JSON with this exact shape:
{
  "description": "string",
  "checklist": ["string"],
  "kpi": "string"
}

Context:
"#,
    );
    let _ = writeln!(out, "- Website: {}", project.url);
    let _ = writeln!(out, "- Country: {}", text_or_placeholder(&ctx.country));
    let _ = writeln!(out, "- Language: {}", text_or_placeholder(&ctx.language));
    let _ = writeln!(out, "- Day: {}", entry.day);
    let _ = writeln!(out, "- Task: {}", entry.task);
    let _ = writeln!(out, "- Primary Goal: {}", text_or_placeholder(&ctx.primary_goal));
    let _ = writeln!(out, "- Business / Offer: {}", text_or_placeholder(&ctx.business_offer));
    let _ = writeln!(out, "- Target Audience: {}", text_or_placeholder(&ctx.target_audience));
    let _ = writeln!(
        out,
        "- Execution Capacity: {}",
        text_or_placeholder(&ctx.execution_capacity)
    );
    let _ = writeln!(out, "- Top Issues: {issues}");
    let _ = writeln!(out, "- Keyword Gaps: {gaps}");
    let _ = writeln!(out, "- Competitors: {competitors}");
    out.push_str(
        "
Rules:
1) Make the description concrete and actionable for this exact task.
2) Keep description between 2 and 3 short sentences.
3) checklist must have exactly 4 concrete items.
4) kpi must be one measurable metric with target.
5) No markdown. No extra keys. No text outside JSON.
",
    );
    out
}

#[must_use]
pub fn detail_retry_instruction(reason: &str) -> String {
    format!(
        "

Previous output was invalid: {reason}
Regenerate strict compact JSON only.
Keep every string short and ensure all braces are closed."
    )
}
