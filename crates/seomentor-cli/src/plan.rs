//! Plan command handlers: day detail, calendar, and delivery.

use chrono::{Datelike, NaiveDate};
use seomentor_core::{CalendarCell, DetailRecord, YearMonth};
use seomentor_pipeline::{AnalysisService, CalendarView};

pub(crate) fn format_detail(record: &DetailRecord) -> String {
    let mut out = format!("Day {}: {}\n\n{}\n\nChecklist:\n", record.day, record.task, record.description);
    for (i, item) in record.checklist.iter().enumerate() {
        out.push_str(&format!("  {}. {item}\n", i + 1));
    }
    out.push_str(&format!("\nKPI: {}\n", record.kpi));
    out
}

/// Monday-first grid; plan dates are marked with `*`, followed by the tasks
/// falling in the month.
pub(crate) fn format_calendar(view: &CalendarView) -> String {
    let mut out = format!(
        "{}  (plan {} to {}, {} days)\n",
        view.grid.month, view.start, view.end, view.plan_days
    );
    out.push_str(" Mo  Tu  We  Th  Fr  Sa  Su\n");

    for week in view.grid.weeks() {
        let row: Vec<String> = week
            .iter()
            .map(|cell| match cell {
                CalendarCell::Placeholder => "   ".to_string(),
                CalendarCell::Date { date, in_plan, .. } => {
                    format!("{:>2}{}", date.day(), if *in_plan { '*' } else { ' ' })
                }
            })
            .collect();
        out.push_str(row.join(" ").trim_end());
        out.push('\n');
    }

    let tasks: Vec<String> = view
        .grid
        .cells
        .iter()
        .filter_map(|cell| match cell {
            CalendarCell::Date {
                date,
                plan_day: Some(day),
                task,
                ..
            } => Some(format!(
                "{date}  day {day:>2}  {}",
                task.as_deref().unwrap_or_default()
            )),
            _ => None,
        })
        .collect();
    if !tasks.is_empty() {
        out.push('\n');
        for line in tasks {
            out.push_str(&line);
            out.push('\n');
        }
    }

    let nav = |label: &str, month: Option<YearMonth>| month.map(|m| format!("{label} {m}"));
    let links: Vec<String> = [nav("prev:", view.prev_month), nav("next:", view.next_month)]
        .into_iter()
        .flatten()
        .collect();
    if !links.is_empty() {
        out.push('\n');
        out.push_str(&links.join("  "));
        out.push('\n');
    }
    out
}

/// # Errors
///
/// Returns an error for an unknown project or day, or when expansion fails.
pub(crate) async fn run_detail(
    service: &AnalysisService,
    id: i64,
    day: u32,
    refresh: bool,
) -> anyhow::Result<()> {
    let record = service.day_detail(id, day, refresh).await?;
    print!("{}", format_detail(&record));
    Ok(())
}

/// # Errors
///
/// Returns an error if the project does not exist.
pub(crate) async fn run_calendar(
    service: &AnalysisService,
    id: i64,
    start: Option<NaiveDate>,
    month: Option<YearMonth>,
) -> anyhow::Result<()> {
    let view = service.calendar(id, start, month).await?;
    print!("{}", format_calendar(&view));
    Ok(())
}

/// # Errors
///
/// Returns an error for an invalid recipient or when delivery fails.
pub(crate) async fn run_email(
    service: &AnalysisService,
    id: i64,
    recipient: &str,
) -> anyhow::Result<()> {
    let delivery = service.send_plan(id, recipient).await?;
    println!("{}", delivery.message);
    Ok(())
}
