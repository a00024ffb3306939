//! cohort-runner: headless driver for the cohort retention / LTV core.
//!
//! Usage:
//!   cohort-runner --data-dir ./data --dimension category --value "pom hl"
//!   cohort-runner --synthetic --seed 12345 --cohorts 12
//!   cohort-runner --synthetic --ipc-mode

use anyhow::Result;
use cohort_core::{
    config::CohortConfig,
    dashboard::{CohortDashboard, FilterOptions, LtvView},
    fact::{Dimension, Measure, Metric, Segment},
    filter::FilterCriteria,
    month::{to_cohort_key, MonthKey},
    pivot::RetentionPivot,
    synthetic::SyntheticSpec,
};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetCriteria { criteria: FilterCriteria },
    Options { dimension: Dimension },
    Quit,
}

#[derive(serde::Serialize)]
struct UiState<'a> {
    criteria:         &'a FilterCriteria,
    observed_through: Option<MonthKey>,
    retention:        RetentionPivot,
    ltv:              LtvView,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let synthetic = args.iter().any(|a| a == "--synthetic");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let seed = parse_arg(&args, "--seed", 42u64);
    let cohorts = parse_arg(&args, "--cohorts", 12u32);
    let data_dir = flag_value(&args, "--data-dir").unwrap_or("./data");

    let dashboard = if synthetic {
        let first = to_cohort_key(flag_value(&args, "--first-cohort").unwrap_or("2025-01"))
            .ok_or_else(|| anyhow::anyhow!("--first-cohort must be YYYY-MM"))?;
        CohortDashboard::from_synthetic(
            &SyntheticSpec::new(seed, first, cohorts),
            CohortConfig::default_test(),
        )
    } else {
        CohortDashboard::load(data_dir)?
    };

    let mut criteria = criteria_from_args(&args)?;

    if ipc_mode {
        run_ipc_loop(&dashboard, &mut criteria)?;
    } else {
        println!("cohort-runner");
        if synthetic {
            println!("  source:    synthetic (seed {seed}, {cohorts} cohorts)");
        } else {
            println!("  source:    {data_dir}");
        }
        println!("  boundary:  {}", fmt_key(dashboard.observation_boundary()));
        println!("  view:      {} / {} / {} / {}",
            criteria.dimension.as_str(),
            criteria.dimension_value,
            criteria.metric.as_str(),
            criteria.segment.as_str());
        println!();
        print_retention(&dashboard.retention_view(&criteria));
        println!();
        print_ltv(&dashboard.ltv_view(&criteria), criteria.measure);
    }

    Ok(())
}

fn run_ipc_loop(dashboard: &CohortDashboard, criteria: &mut FilterCriteria) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let state = build_ui_state(dashboard, criteria);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::SetCriteria { criteria: next } => {
                log::debug!("criteria changed: {next:?}");
                *criteria = next;
                let state = build_ui_state(dashboard, criteria);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::Options { dimension } => {
                let options: FilterOptions = dashboard.filter_options(dimension);
                writeln!(stdout, "{}", serde_json::to_string(&options)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_ui_state<'a>(dashboard: &CohortDashboard, criteria: &'a FilterCriteria) -> UiState<'a> {
    UiState {
        criteria,
        observed_through: dashboard.observation_boundary(),
        retention: dashboard.retention_view(criteria),
        ltv: dashboard.ltv_view(criteria),
    }
}

fn criteria_from_args(args: &[String]) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::default();
    if let Some(d) = flag_value(args, "--dimension") {
        criteria.dimension = d.parse::<Dimension>()?;
    }
    if let Some(v) = flag_value(args, "--value") {
        criteria.dimension_value = v.to_string();
    }
    if let Some(m) = flag_value(args, "--metric") {
        criteria.metric = m.parse::<Metric>()?;
    }
    if let Some(s) = flag_value(args, "--segment") {
        criteria.segment = s.parse::<Segment>()?;
    }
    if let Some(m) = flag_value(args, "--measure") {
        criteria.measure = m.parse::<Measure>()?;
    }
    criteria.start_month = month_bound(args, "--from")?;
    criteria.end_month = month_bound(args, "--to")?;
    Ok(criteria)
}

/// A blank bound is open, same as omitting the flag.
fn month_bound(args: &[String], flag: &str) -> Result<Option<MonthKey>> {
    let raw = flag_value(args, flag).map(str::trim).filter(|s| !s.is_empty());
    Ok(raw.map(str::parse::<MonthKey>).transpose()?)
}

// ── Text rendering ─────────────────────────────────────────────

fn print_retention(pivot: &RetentionPivot) {
    println!("=== RETENTION ===");
    if pivot.rows.is_empty() {
        println!("  (No cohorts match this selection)");
        return;
    }
    print_header(pivot.max_month, "");
    for row in &pivot.rows {
        let cells: Vec<String> = row
            .cells(pivot.max_month)
            .into_iter()
            .map(|c| match c {
                Some(v) => format!("{:>7.1}%", v * 100.0),
                None => format!("{:>8}", "·"),
            })
            .collect();
        println!("  {} {:>6} {}", row.cohort_month, row.cohort_size, cells.join(""));
    }
}

fn print_ltv(view: &LtvView, measure: Measure) {
    println!("=== LTV ({}) ===", measure.as_str());
    if view.rows.is_empty() {
        println!("  (No cohorts match this selection)");
        return;
    }
    print_header(view.max_month, "       CAC  B/E");
    for r in &view.rows {
        let cells: Vec<String> = r
            .row
            .cells(view.max_month)
            .into_iter()
            .map(|c| match c {
                Some(v) => format!("{v:>8.0}"),
                None => format!("{:>8}", "·"),
            })
            .collect();
        let cac = r.overlay.cac.map(|c| format!("{c:>10.2}")).unwrap_or_else(|| format!("{:>10}", "—"));
        let be = r.overlay.break_even_month.map(|m| format!("{:>5}", format!("M{m}"))).unwrap_or_else(|| format!("{:>5}", "—"));
        println!("  {} {:>6} {}{cac}{be}", r.row.cohort_month, r.row.cohort_size, cells.join(""));
    }
    println!("  max cell: {:.2} | CAC in {}", view.max_value, view.display_currency);
}

fn print_header(max_month: u32, suffix: &str) {
    let cols: Vec<String> = (0..=max_month).map(|m| format!("{:>8}", format!("M{m}"))).collect();
    println!("  {:<7} {:>6} {}{suffix}", "cohort", "size", cols.join(""));
}

fn fmt_key(key: Option<MonthKey>) -> String {
    key.map(|k| k.to_string()).unwrap_or_else(|| "(none)".into())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
