//! Analysis command handlers: create, show, and list.

use clap::Args;
use seomentor_core::{AnalysisRequest, ListInput, ProjectSummary};
use seomentor_pipeline::AnalysisService;

/// Arguments of `analyze`. Validation happens in the pipeline so the CLI and
/// the HTTP API reject the same inputs.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Homepage url; a bare domain is treated as https
    pub url: String,
    /// Target country (default: Azerbaijan)
    #[arg(long)]
    pub country: Option<String>,
    /// Content language (default: English)
    #[arg(long)]
    pub language: Option<String>,
    /// Roadmap length in days (7-30)
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    pub plan_days: i64,
    /// Primary goal (default: Increase organic traffic)
    #[arg(long)]
    pub goal: Option<String>,
    /// What the business sells
    #[arg(long, default_value = "")]
    pub offer: String,
    /// Who the business sells to
    #[arg(long, default_value = "")]
    pub audience: String,
    /// Page to prioritize; repeatable
    #[arg(long = "priority-page")]
    pub priority_pages: Vec<String>,
    /// Seed keyword; repeatable
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
    /// Known competitor; repeatable
    #[arg(long = "competitor")]
    pub competitors: Vec<String>,
    /// Available execution capacity, e.g. "2 hours a day"
    #[arg(long, default_value = "")]
    pub capacity: String,
}

fn list_input(items: Vec<String>) -> Option<ListInput> {
    (!items.is_empty()).then(|| ListInput::from(items))
}

impl AnalyzeArgs {
    pub(crate) fn into_request(self) -> AnalysisRequest {
        AnalysisRequest {
            url: self.url,
            country: self.country,
            language: self.language,
            plan_days: Some(self.plan_days),
            primary_goal: self.goal,
            business_offer: self.offer,
            target_audience: self.audience,
            priority_pages: list_input(self.priority_pages),
            seed_keywords: list_input(self.keywords),
            known_competitors: list_input(self.competitors),
            execution_capacity: self.capacity,
        }
    }
}

/// Format the `list` table.
pub(crate) fn format_summaries(summaries: &[ProjectSummary]) -> String {
    let mut out = format!("{:<8}{:<7}{:<6}{:<18}URL\n", "ID", "SCORE", "DAYS", "CREATED");
    for s in summaries {
        out.push_str(&format!(
            "{:<8}{:<7}{:<6}{:<18}{}\n",
            s.id,
            s.seo_score,
            s.plan_days,
            s.created_at.format("%Y-%m-%d %H:%M"),
            s.url
        ));
    }
    out
}

/// Run one analysis end to end and print the stored plan.
///
/// # Errors
///
/// Returns an error if validation, extraction, synthesis, or storage fails.
/// Nothing is stored on failure.
pub(crate) async fn run_analyze(service: &AnalysisService, args: AnalyzeArgs) -> anyhow::Result<()> {
    let id = service.create_analysis(args.into_request()).await?;
    println!("created analysis {id}");
    println!();
    let report = service.plan_report(id).await?;
    print!("{}", report.body);
    Ok(())
}

/// # Errors
///
/// Returns an error if the project does not exist.
pub(crate) async fn run_show(service: &AnalysisService, id: i64) -> anyhow::Result<()> {
    let project = service.get_analysis(id).await?;
    let report = service.plan_report(id).await?;
    println!("Project {id} (created {})", project.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("{}", report.subject);
    println!();
    print!("{}", report.body);
    Ok(())
}

/// # Errors
///
/// Returns an error if the listing query fails.
pub(crate) async fn run_list(service: &AnalysisService, limit: Option<i64>) -> anyhow::Result<()> {
    let summaries = service.list_analyses(limit).await?;
    if summaries.is_empty() {
        println!("no analyses stored yet; run `analyze <url>` first");
        return Ok(());
    }
    print!("{}", format_summaries(&summaries));
    Ok(())
}
