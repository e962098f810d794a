use crate::export::{FileSizeSummaryRow, SummaryRow, summary_rows};
use ingestor::disk::ScanStats;
use processor::{file_sizes::FileSizeAnalysis, traffic::TrafficAnalysis};
use tabled::{builder::Builder as TableBuilder, settings::Style};

const SUMMARY_HEADER: [&str; 8] = ["series", "count", "mean", "min", "p50", "p95", "p99", "max"];

/// Undefined statistics print as "-"
fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.abs() >= 1e6 => format!("{v:.3e}"),
        Some(v) if v != 0.0 && v.abs() < 1e-3 => format!("{v:.3e}"),
        Some(v) => format!("{v:.3}"),
        None => "-".to_string(),
    }
}

fn summary_row(row: &SummaryRow) -> Vec<String> {
    vec![
        row.series.clone(),
        row.count.to_string(),
        cell(row.mean),
        cell(row.min),
        cell(row.p50),
        cell(row.p95),
        cell(row.p99),
        cell(row.max),
    ]
}

pub fn print_traffic_summary(analysis: &TrafficAnalysis) -> String {
    let mut printable = vec![SUMMARY_HEADER.map(String::from).to_vec()];
    printable.extend(summary_rows(analysis).iter().map(summary_row));

    TableBuilder::from(printable)
        .build()
        .with(Style::psql().remove_horizontals())
        .to_string()
}

pub fn print_resets(analysis: &TrafficAnalysis) -> String {
    let mut printable = vec![vec!["counter".to_string(), "resets".to_string()]];
    for (counter, count) in &analysis.resets {
        printable.push(vec![counter.clone(), count.to_string()]);
    }

    TableBuilder::from(printable)
        .build()
        .with(Style::psql().remove_horizontals())
        .to_string()
}

pub fn print_file_size_summary(analysis: &FileSizeAnalysis, stats: &ScanStats) -> String {
    let row = FileSizeSummaryRow::from(analysis);
    let printable = vec![
        vec![
            "files".to_string(),
            "empty".to_string(),
            "skipped".to_string(),
            "excluded".to_string(),
            "mean".to_string(),
            "p50".to_string(),
            "p95".to_string(),
            "p99".to_string(),
            "max".to_string(),
        ],
        vec![
            row.files_scanned.to_string(),
            row.empty_files.to_string(),
            stats.skipped.to_string(),
            stats.excluded.to_string(),
            cell(row.mean),
            cell(row.p50),
            cell(row.p95),
            cell(row.p99),
            cell(row.max),
        ],
    ];

    TableBuilder::from(printable)
        .build()
        .with(Style::psql().remove_horizontals())
        .to_string()
}
