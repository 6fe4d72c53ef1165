//! Output formatting for CLI

use crate::cli::progress::format_number;
use crate::load::ProjectReport;

/// Format the summary of a completed load
pub fn format_summary(report: &ProjectReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\nLoaded {} table(s) into schema '{}':\n",
        report.tables.len(),
        report.schema
    ));
    for table in &report.tables {
        output.push_str(&format!(
            "  {:<32} {:>12} rows  {:>4} batch(es)\n",
            table.table,
            format_number(table.rows() as u64),
            table.batches()
        ));
    }

    output.push_str(&format!(
        "\nTotal: {} rows in {} ({:.0} rows/s)\n",
        format_number(report.rows() as u64),
        report.duration_string(),
        report.throughput()
    ));
    output.push_str(&format!("Run ID: {}\n", report.run_id));

    output
}

/// Format the result of a dry run
pub fn format_dry_run(report: &ProjectReport) -> String {
    let mut output = String::new();

    for table in &report.tables {
        output.push_str(&format!("\n{}.{}:\n", table.schema, table.table));
        for source in &table.sources {
            output.push_str(&format!(
                "  - {} [{}] {}\n",
                source.name,
                source.format,
                source.path.display()
            ));
        }
    }

    output.push_str(&format!(
        "\n✅ {} table(s), {} source file(s) validated. No changes made.\n",
        report.tables.len(),
        report.source_count()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load::{SourceReport, TableReport};
    use crate::source::SourceFormat;
    use std::path::PathBuf;
    use std::time::Duration;

    fn report() -> ProjectReport {
        let mut table = TableReport::new("sales", "orders");
        table.sources.push(SourceReport {
            name: "orders.csv".to_string(),
            path: PathBuf::from("datasets/sales/orders.csv"),
            format: SourceFormat::DelimitedText,
            batches: 2,
            rows: 1500,
            duration: Duration::from_millis(20),
        });

        let mut report = ProjectReport::new("sales", "sales", false);
        report.tables.push(table);
        report
    }

    #[test]
    fn test_format_summary() {
        let output = format_summary(&report());
        assert!(output.contains("Loaded 1 table(s) into schema 'sales'"));
        assert!(output.contains("orders"));
        assert!(output.contains("1,500"));
        assert!(output.contains("Run ID:"));
    }

    #[test]
    fn test_format_dry_run() {
        let output = format_dry_run(&report());
        assert!(output.contains("sales.orders:"));
        assert!(output.contains("orders.csv [csv]"));
        assert!(output.contains("1 source file(s) validated"));
    }
}
