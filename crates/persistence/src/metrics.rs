//! Store metrics collection.

use metrics::{counter, histogram};
use std::time::Instant;

/// Record the duration of a file operation.
pub fn record_operation_duration(file: &str, operation: &'static str, duration_secs: f64) {
    histogram!(
        "store_operation_duration_seconds",
        "file" => file.to_string(),
        "operation" => operation
    )
    .record(duration_secs);
}

/// Count a read that fell back to defaults because the file was unreadable.
pub fn record_read_fallback(file: &str) {
    counter!("store_read_fallbacks_total", "file" => file.to_string()).increment(1);
}

/// Times one store operation and records it on [`OperationTimer::record`].
///
/// ```ignore
/// let timer = OperationTimer::new("employees.json", "write");
/// let result = write_file(&path, &value).await;
/// timer.record();
/// ```
pub struct OperationTimer {
    file: String,
    operation: &'static str,
    start: Instant,
}

impl OperationTimer {
    pub fn new(file: impl Into<String>, operation: &'static str) -> Self {
        Self {
            file: file.into(),
            operation,
            start: Instant::now(),
        }
    }

    pub fn record(self) {
        let duration = self.start.elapsed().as_secs_f64();
        record_operation_duration(&self.file, self.operation, duration);
    }
}
