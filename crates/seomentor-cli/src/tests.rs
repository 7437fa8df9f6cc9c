use chrono::{NaiveDate, TimeZone, Utc};
use seomentor_core::{DetailRecord, ListInput, PlanCalendar, ProjectSummary, RoadmapDay};
use seomentor_pipeline::CalendarView;

use super::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["seomentor-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["seomentor-cli", "db", "ping"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["seomentor-cli", "db", "migrate"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn analyze_defaults_to_thirty_days_and_no_lists() {
    let cli = Cli::try_parse_from(["seomentor-cli", "analyze", "example.com"]).unwrap();
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze");
    };
    let request = args.into_request();
    assert_eq!(request.url, "example.com");
    assert_eq!(request.plan_days, Some(30));
    assert!(request.country.is_none());
    assert!(request.primary_goal.is_none());
    assert!(request.seed_keywords.is_none());
    assert!(request.business_offer.is_empty());
}

#[test]
fn analyze_collects_repeated_list_flags() {
    let cli = Cli::try_parse_from([
        "seomentor-cli",
        "analyze",
        "https://flowers.az",
        "--plan-days",
        "14",
        "--country",
        "Georgia",
        "--goal",
        "More leads",
        "--offer",
        "Flower delivery",
        "--keyword",
        "flowers baku",
        "--keyword",
        "rose bouquet",
        "--competitor",
        "Flora",
        "--priority-page",
        "/delivery",
    ])
    .unwrap();
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze");
    };
    let request = args.into_request();
    assert_eq!(request.plan_days, Some(14));
    assert_eq!(request.country.as_deref(), Some("Georgia"));
    assert_eq!(request.primary_goal.as_deref(), Some("More leads"));
    assert_eq!(request.business_offer, "Flower delivery");
    assert_eq!(
        request.seed_keywords,
        Some(ListInput::from(vec![
            "flowers baku".to_owned(),
            "rose bouquet".to_owned()
        ]))
    );
    assert_eq!(
        request.known_competitors,
        Some(ListInput::from(vec!["Flora".to_owned()]))
    );
    assert_eq!(
        request.priority_pages,
        Some(ListInput::from(vec!["/delivery".to_owned()]))
    );
}

#[test]
fn analyze_accepts_out_of_range_days_for_pipeline_validation() {
    let cli =
        Cli::try_parse_from(["seomentor-cli", "analyze", "example.com", "--plan-days", "-3"])
            .unwrap();
    let Some(Commands::Analyze(args)) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(args.plan_days, -3);
}

#[test]
fn analyze_requires_url() {
    assert!(Cli::try_parse_from(["seomentor-cli", "analyze"]).is_err());
}

#[test]
fn parses_show_and_list() {
    let cli = Cli::try_parse_from(["seomentor-cli", "show", "42"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Show { id: 42 })));

    let cli = Cli::try_parse_from(["seomentor-cli", "list"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::List { limit: None })));

    let cli = Cli::try_parse_from(["seomentor-cli", "list", "--limit", "5"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::List { limit: Some(5) })));
}

#[test]
fn parses_detail_with_refresh() {
    let cli = Cli::try_parse_from(["seomentor-cli", "detail", "7", "3", "--refresh"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Detail {
            id: 7,
            day: 3,
            refresh: true
        })
    ));

    let cli = Cli::try_parse_from(["seomentor-cli", "detail", "7", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Detail { refresh: false, .. })
    ));
}

#[test]
fn detail_rejects_negative_day() {
    assert!(Cli::try_parse_from(["seomentor-cli", "detail", "7", "-1"]).is_err());
}

#[test]
fn parses_calendar_start_and_month() {
    let cli = Cli::try_parse_from([
        "seomentor-cli",
        "calendar",
        "9",
        "--start",
        "2024-01-15",
        "--month",
        "2024-02",
    ])
    .unwrap();
    let Some(Commands::Calendar { id, start, month }) = cli.command else {
        panic!("expected calendar");
    };
    assert_eq!(id, 9);
    assert_eq!(start, Some(date(2024, 1, 15)));
    assert_eq!(month, YearMonth::new(2024, 2));
}

#[test]
fn calendar_rejects_malformed_month() {
    assert!(
        Cli::try_parse_from(["seomentor-cli", "calendar", "9", "--month", "2024-13"]).is_err()
    );
    assert!(
        Cli::try_parse_from(["seomentor-cli", "calendar", "9", "--start", "15/01/2024"]).is_err()
    );
}

#[test]
fn parses_email_command() {
    let cli = Cli::try_parse_from(["seomentor-cli", "email", "3", "ops@example.com"]).unwrap();
    let Some(Commands::Email { id, recipient }) = cli.command else {
        panic!("expected email");
    };
    assert_eq!(id, 3);
    assert_eq!(recipient, "ops@example.com");
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

#[test]
fn summaries_render_as_table() {
    let summaries = vec![ProjectSummary {
        id: 12,
        url: "https://example.com/".to_owned(),
        seo_score: 64,
        plan_days: 14,
        created_at: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
    }];
    let table = analyses::format_summaries(&summaries);
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ID"));
    assert!(lines[0].ends_with("URL"));
    assert!(lines[1].starts_with("12 "));
    assert!(lines[1].contains("64"));
    assert!(lines[1].contains("2024-03-05 09:30"));
    assert!(lines[1].ends_with("https://example.com/"));
}

#[test]
fn detail_lists_numbered_checklist() {
    let record = DetailRecord {
        day: 2,
        task: "Fix title tags".to_owned(),
        description: "Rewrite titles on the top pages.".to_owned(),
        checklist: vec!["Audit".to_owned(), "Rewrite".to_owned()],
        kpi: "CTR +0.5pp".to_owned(),
    };
    let text = plan::format_detail(&record);
    assert!(text.starts_with("Day 2: Fix title tags\n"));
    assert!(text.contains("  1. Audit\n"));
    assert!(text.contains("  2. Rewrite\n"));
    assert!(text.ends_with("KPI: CTR +0.5pp\n"));
}

#[test]
fn calendar_marks_plan_dates_and_navigation() {
    let roadmap: Vec<RoadmapDay> = (1..=7)
        .map(|day| RoadmapDay {
            day,
            task: format!("Task {day}"),
        })
        .collect();
    let start = date(2024, 1, 29);
    let calendar = PlanCalendar::new(start, 7);
    let month = YearMonth::of(start);
    let view = CalendarView {
        project_id: 1,
        start,
        end: calendar.end_date(),
        plan_days: 7,
        months: calendar.months(),
        grid: calendar.month_grid(month, &roadmap),
        prev_month: calendar.has_prev(month).then(|| month.prev()),
        next_month: calendar.has_next(month).then(|| month.next()),
    };

    let text = plan::format_calendar(&view);
    assert!(text.starts_with("2024-01  (plan 2024-01-29 to 2024-02-04, 7 days)\n"));
    assert!(text.contains(" Mo  Tu  We  Th  Fr  Sa  Su\n"));
    assert!(text.contains(" 1   2   3   4   5   6   7\n"));
    assert!(text.contains("29* 30* 31*\n"));
    assert!(text.contains("2024-01-29  day  1  Task 1\n"));
    assert!(text.contains("2024-01-31  day  3  Task 3\n"));
    assert!(!text.contains("Task 4"));
    assert!(text.ends_with("next: 2024-02\n"));
    assert!(!text.contains("prev:"));
}
