//! Progress reporting for load operations
//!
//! This module provides a progress display for `load-data` using the
//! `indicatif` crate.

use std::cell::Cell;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::load::{LoadObserver, TableReport};
use crate::source::SourceFile;
use crate::warehouse::TableRef;

/// Progress display driven by load notifications
pub struct LoadProgress {
    _multi: MultiProgress,
    tables_bar: ProgressBar,
    rows_bar: ProgressBar,
    table_rows: Cell<u64>,
}

impl LoadProgress {
    /// Create a new progress display
    ///
    /// # Arguments
    /// * `total_tables` - Number of tables in the project
    pub fn new(total_tables: u64) -> Self {
        let multi = MultiProgress::new();

        let tables_bar = multi.add(ProgressBar::new(total_tables));
        tables_bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} tables {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  "),
        );
        tables_bar.enable_steady_tick(Duration::from_millis(100));

        let rows_bar = multi.add(ProgressBar::new_spinner());
        rows_bar.set_style(
            ProgressStyle::with_template("{spinner:.yellow} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        rows_bar.enable_steady_tick(Duration::from_millis(100));

        Self {
            _multi: multi,
            tables_bar,
            rows_bar,
            table_rows: Cell::new(0),
        }
    }

    /// Finish with success message
    pub fn finish_success(&self, msg: &str) {
        self.tables_bar.finish_with_message(format!("✓ {}", msg));
        self.rows_bar.finish_and_clear();
    }

    /// Finish with error message
    pub fn finish_error(&self, msg: &str) {
        self.tables_bar.abandon_with_message(format!("✗ {}", msg));
        self.rows_bar.finish_and_clear();
    }
}

impl LoadObserver for LoadProgress {
    fn table_started(&self, table: &TableRef, _sources: &[SourceFile]) {
        self.table_rows.set(0);
        self.tables_bar.set_message(table.to_string());
        self.rows_bar.set_message("Truncating...");
    }

    fn source_started(&self, _table: &TableRef, source: &SourceFile) {
        self.rows_bar.set_message(format!("{} ({})", source.name, format_bytes(source.size)));
    }

    fn batch_loaded(&self, _table: &TableRef, index: usize, rows: usize) {
        let total = self.table_rows.get() + rows as u64;
        self.table_rows.set(total);
        self.rows_bar.set_message(format!(
            "Rows: {} (batch {})",
            format_number(total),
            index + 1
        ));
    }

    fn table_finished(&self, report: &TableReport) {
        self.tables_bar.println(format!(
            "  ✓ {}.{}: {} rows from {} source(s)",
            report.schema,
            report.table,
            format_number(report.rows() as u64),
            report.sources.len()
        ));
        self.tables_bar.inc(1);
    }
}

/// Format a number with thousand separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
