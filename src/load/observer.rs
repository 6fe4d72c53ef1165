//! Load progress callbacks

use super::report::TableReport;
use crate::source::SourceFile;
use crate::warehouse::TableRef;

/// Receives progress notifications during a load
///
/// All methods default to doing nothing.
pub trait LoadObserver {
    /// A table is about to be truncated and reloaded
    fn table_started(&self, _table: &TableRef, _sources: &[SourceFile]) {}

    /// A source file is about to be streamed
    fn source_started(&self, _table: &TableRef, _source: &SourceFile) {}

    /// One batch was appended
    fn batch_loaded(&self, _table: &TableRef, _index: usize, _rows: usize) {}

    /// A table finished loading
    fn table_finished(&self, _report: &TableReport) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl LoadObserver for NoopObserver {}
