use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analysis::Project;
use crate::calendar::PlanCalendar;

/// Plain-text rendering of a project, handed to notification delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanReport {
    pub subject: String,
    pub body: String,
}

/// Render `project` as a report whose roadmap is dated from `start`.
#[must_use]
pub fn render_plan_report(project: &Project, start: NaiveDate) -> PlanReport {
    let artifact = &project.artifact;
    let calendar = PlanCalendar::new(start, artifact.plan_days());

    let subject = format!(
        "SEO plan for {} ({} days, score {}/100)",
        project.url,
        artifact.plan_days(),
        artifact.seo_score
    );

    // Writing to a String cannot fail.
    let mut body = String::new();
    let _ = writeln!(body, "Website: {}", project.url);
    let _ = writeln!(body, "SEO score: {}/100", artifact.seo_score);
    let _ = writeln!(
        body,
        "Plan window: {} to {}",
        calendar.start(),
        calendar.end_date()
    );

    push_section(&mut body, "Issues", artifact.issues.iter().map(String::as_str));

    body.push_str("\nCompetitors\n");
    if artifact.competitors.is_empty() {
        body.push_str("- none identified\n");
    }
    for competitor in &artifact.competitors {
        let _ = write!(body, "- {}", competitor.name);
        if let Some(url) = &competitor.url {
            let _ = write!(body, " <{url}>");
        }
        if !competitor.reason.is_empty() {
            let _ = write!(body, ": {}", competitor.reason);
        }
        body.push('\n');
    }

    push_section(
        &mut body,
        "Keyword gaps",
        artifact.keyword_gaps.iter().map(String::as_str),
    );

    body.push_str("\nRoadmap\n");
    for entry in &artifact.roadmap {
        let date = calendar
            .date_for(entry.day)
            .map_or_else(String::new, |d| d.format("%a %Y-%m-%d").to_string());
        let _ = writeln!(body, "Day {:>2}  {date}  {}", entry.day, entry.task);
    }

    PlanReport { subject, body }
}

fn push_section<'a>(body: &mut String, title: &str, items: impl Iterator<Item = &'a str>) {
    body.push('\n');
    body.push_str(title);
    body.push('\n');
    let mut any = false;
    for item in items {
        any = true;
        let _ = writeln!(body, "- {item}");
    }
    if !any {
        body.push_str("- none identified\n");
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::analysis::{AnalysisArtifact, Competitor, RoadmapDay};
    use crate::request::AnalysisRequest;

    fn project() -> Project {
        let context = AnalysisRequest {
            url: "https://example.com".to_string(),
            business_offer: "Bakery".to_string(),
            plan_days: Some(7),
            ..AnalysisRequest::default()
        }
        .into_context()
        .expect("valid context");

        Project {
            id: 3,
            url: "https://example.com/".to_string(),
            artifact: AnalysisArtifact {
                seo_score: 58,
                issues: vec!["Title is too short".to_string()],
                competitors: vec![
                    Competitor {
                        name: "Paul".to_string(),
                        reason: "Ranks for 'croissant baku'".to_string(),
                        url: Some("https://paul.az".to_string()),
                    },
                    Competitor {
                        name: "Entree".to_string(),
                        reason: String::new(),
                        url: None,
                    },
                ],
                keyword_gaps: vec![],
                roadmap: (1..=7)
                    .map(|day| RoadmapDay {
                        day,
                        task: format!("Task {day}"),
                    })
                    .collect(),
            },
            context,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn subject_names_site_length_and_score() {
        let report = render_plan_report(&project(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(
            report.subject,
            "SEO plan for https://example.com/ (7 days, score 58/100)"
        );
    }

    #[test]
    fn roadmap_lines_are_dated_from_start() {
        let report = render_plan_report(&project(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(report.body.contains("Day  1  Mon 2024-01-01  Task 1"));
        assert!(report.body.contains("Day  7  Sun 2024-01-07  Task 7"));
        assert!(report.body.contains("Plan window: 2024-01-01 to 2024-01-07"));
    }

    #[test]
    fn competitors_render_url_and_reason_when_present() {
        let report = render_plan_report(&project(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(report
            .body
            .contains("- Paul <https://paul.az>: Ranks for 'croissant baku'"));
        assert!(report.body.contains("- Entree\n"));
    }

    #[test]
    fn empty_sections_say_none_identified() {
        let report = render_plan_report(&project(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(report.body.contains("Keyword gaps\n- none identified\n"));
    }
}
