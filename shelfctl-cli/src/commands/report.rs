//! Report command - reads the precomputed circulation views

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};
use shelfctl_core::{Row, Transport};

use super::Session;
use crate::output::{write_rows, OutputFormat};

#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Which report to show (default: all three)
    #[arg(value_enum)]
    pub which: Option<ReportKind>,

    /// Rows in the most-borrowed report (default from config, else 5)
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Most borrowed books
    Top,
    /// Members with overdue loans
    Overdue,
    /// Number of books each member has borrowed
    Counts,
}

impl ReportKind {
    fn heading(&self) -> &'static str {
        match self {
            ReportKind::Top => "Top borrowed:",
            ReportKind::Overdue => "Overdue members:",
            ReportKind::Counts => "Borrow count per member:",
        }
    }

    fn json_key(&self) -> &'static str {
        match self {
            ReportKind::Top => "most_borrowed",
            ReportKind::Overdue => "overdue_members",
            ReportKind::Counts => "borrow_counts",
        }
    }
}

pub async fn run_report<T: Transport, W: Write>(
    args: ReportArgs,
    session: &Session<T>,
    out: &mut W,
) -> Result<()> {
    let limit = args.limit.unwrap_or(session.top_limit);
    let lib = &session.library;

    let sections: Vec<(ReportKind, Vec<Row>)> = match args.which {
        Some(kind) => {
            let rows = match kind {
                ReportKind::Top => {
                    session
                        .progress
                        .wrap("Loading report...", lib.top_most_borrowed(limit))
                        .await
                }
                ReportKind::Overdue => {
                    session
                        .progress
                        .wrap("Loading report...", lib.list_overdue_members())
                        .await
                }
                ReportKind::Counts => {
                    session
                        .progress
                        .wrap("Loading report...", lib.count_borrowed_per_member())
                        .await
                }
            }
            .with_context(|| format!("failed to load {} report", kind.json_key()))?;
            vec![(kind, rows)]
        }
        None => {
            let report = session
                .progress
                .wrap("Loading reports...", lib.report(limit))
                .await
                .context("failed to load reports")?;
            vec![
                (ReportKind::Top, report.most_borrowed),
                (ReportKind::Overdue, report.overdue_members),
                (ReportKind::Counts, report.borrow_counts),
            ]
        }
    };

    match session.format {
        OutputFormat::Lines => {
            for (kind, rows) in &sections {
                writeln!(out, "\n{}", kind.heading())?;
                write_rows(out, rows, OutputFormat::Lines)?;
            }
        }
        OutputFormat::Json => {
            let mut object = Map::new();
            for (kind, rows) in sections {
                let rows = rows.into_iter().map(Value::Object).collect();
                object.insert(kind.json_key().to_string(), Value::Array(rows));
            }
            serde_json::to_writer_pretty(&mut *out, &Value::Object(object))?;
            writeln!(out)?;
        }
    }
    Ok(())
}
