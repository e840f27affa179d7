use crate::cli::ReportArgs;
use crate::error::{Error, Result};
use crate::storage::{SchemaVariant, open_read_only};
use crate::storage::report::{self, ReportEntry, Summary};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

const DEFAULT_TOP: usize = 15;
const DEFAULT_SELF_THRESHOLD: f64 = 0.5;
const DEFAULT_SECTION_LIMIT: usize = 10;
const SEARCH_LIMIT: usize = 20;
const CYCLE_LIMIT: usize = 20;

/// Which entry columns a section prints
#[derive(Clone, Copy)]
enum Layout {
    Total,
    SelfTime,
    Children,
}

#[derive(Serialize)]
pub struct Section {
    pub title: String,
    #[serde(skip)]
    layout: Layout,
    pub entries: Vec<ReportEntry>,
}

#[derive(Serialize)]
pub struct Report {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
    pub sections: Vec<Section>,
}

/// Sections chosen for one report run
struct Plan<'a> {
    stats: bool,
    top: Option<usize>,
    /// Threshold and row count
    self_time: Option<(f64, usize)>,
    children: Option<usize>,
    search: Option<&'a str>,
    cycles: bool,
}

impl<'a> Plan<'a> {
    /// `--all`, or no section flag, runs the standard sections and nothing else
    fn from_args(args: &'a ReportArgs) -> Self {
        if args.all || args.wants_defaults() {
            Plan {
                stats: true,
                top: Some(DEFAULT_TOP),
                self_time: Some((DEFAULT_SELF_THRESHOLD, DEFAULT_SECTION_LIMIT)),
                children: Some(DEFAULT_SECTION_LIMIT),
                search: None,
                cycles: true,
            }
        } else {
            Plan {
                stats: args.stats,
                top: args.top,
                self_time: args.self_time.map(|threshold| (threshold, DEFAULT_TOP)),
                children: args.children,
                search: args.search.as_deref(),
                cycles: args.cycles,
            }
        }
    }
}

/// Collect every requested section from an open database
pub fn build(conn: &Connection, file: &Path, args: &ReportArgs) -> Result<Report> {
    let plan = Plan::from_args(args);
    let mut sections = Vec::new();

    let summary = if plan.stats {
        Some(report::summary(conn)?)
    } else {
        None
    };

    if let Some(limit) = plan.top {
        sections.push(Section {
            title: format!("Top {limit} CPU Time Consumers"),
            layout: Layout::Total,
            entries: report::top_cpu(conn, limit)?,
        });
    }

    if let Some((threshold, limit)) = plan.self_time {
        sections.push(Section {
            title: format!("Functions with Self-Time > {threshold} (Top {limit})"),
            layout: Layout::SelfTime,
            entries: report::high_self_time(conn, threshold, limit)?,
        });
    }

    if let Some(limit) = plan.children {
        sections.push(Section {
            title: format!("Functions with Expensive Children (Top {limit})"),
            layout: Layout::Children,
            entries: report::expensive_children(conn, limit)?,
        });
    }

    if let Some(pattern) = plan.search {
        sections.push(Section {
            title: format!("Functions matching '{pattern}' (Top {SEARCH_LIMIT})"),
            layout: Layout::Total,
            entries: report::search(conn, pattern, SEARCH_LIMIT)?,
        });
    }

    if plan.cycles {
        sections.push(Section {
            title: "Call Cycles Detected".to_string(),
            layout: Layout::Total,
            entries: report::cycles(conn, CYCLE_LIMIT)?,
        });
    }

    Ok(Report {
        file: file.display().to_string(),
        summary,
        sections,
    })
}

pub fn run(args: &ReportArgs) -> Result<()> {
    args.validate().map_err(Error::InvalidArgument)?;

    let conn = open_read_only(&args.file)?;
    SchemaVariant::detect(&conn)?;
    let report = build(&conn, &args.file, args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)?;
        println!("{json}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &Report) {
    println!("# {}", report.file);

    if let Some(summary) = &report.summary {
        print_heading("Statistical Summary");
        let rows = [
            ("Total Entries:", summary.total_entries.to_string()),
            ("Entries with Timing:", summary.with_timing.to_string()),
            ("Avg % Total:", format_opt(summary.avg_pct_total)),
            ("Max % Total:", format_opt(summary.max_pct_total)),
            ("Sum Self Time:", format_opt(summary.sum_self_time)),
            ("Avg Self Time:", format_opt(summary.avg_self_time)),
        ];
        for (label, value) in rows {
            println!("{label:25} {value}");
        }
    }

    for section in &report.sections {
        print_heading(&section.title);
        if section.entries.is_empty() {
            println!("(No results)");
            continue;
        }
        println!("{}", section_table(section));
    }
}

fn print_heading(title: &str) {
    println!("\n{}", "=".repeat(70));
    println!("  {title}");
    println!("{}\n", "=".repeat(70));
}

fn section_table(section: &Section) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header: &[&str] = match section.layout {
        Layout::Total => &["Function Name", "% Total", "Self Time", "Children Time", "Index"],
        Layout::SelfTime => &["Function Name", "Self Time", "% Total", "Children Time", "Self %"],
        Layout::Children => &["Function Name", "Children Time", "Self Time", "% Total", "Children %"],
    };
    table.set_header(header.to_vec());

    for entry in &section.entries {
        let name = entry.name.clone().unwrap_or_default();
        let numbers = match section.layout {
            Layout::Total => [
                format_opt(entry.pct_total),
                format_opt(entry.time_self),
                format_opt(entry.time_children),
                entry.index.map(|i| i.to_string()).unwrap_or_default(),
            ],
            Layout::SelfTime => [
                format_opt(entry.time_self),
                format_opt(entry.pct_total),
                format_opt(entry.time_children),
                format_opt(entry.share_pct),
            ],
            Layout::Children => [
                format_opt(entry.time_children),
                format_opt(entry.time_self),
                format_opt(entry.pct_total),
                format_opt(entry.share_pct),
            ],
        };

        let mut row = vec![Cell::new(name)];
        row.extend(
            numbers
                .into_iter()
                .map(|n| Cell::new(n).set_alignment(CellAlignment::Right)),
        );
        table.add_row(row);
    }
    table
}

fn format_opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
