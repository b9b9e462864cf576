use std::fmt::Debug;

use super::ScanReport;

/// Trait for formatting scan reports.
///
/// A `ReportFormatter` defines what a consumer of a harvest receives for
/// every source scanned.
pub trait ReportFormatter: Send + Sync + 'static {
    type Output: Send + Sync + 'static + Clone + Debug;

    fn format(&self, report: &ScanReport) -> Self::Output;
}

/// Formats a report as its literals, one per line, exactly as found.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawFormatter;
/// Formats a report as the structured [`ScanReport`] itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredFormatter;
/// Formats a report as a JSON string.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl ReportFormatter for RawFormatter {
    type Output = String;

    fn format(&self, report: &ScanReport) -> Self::Output {
        report.addresses.join("\n")
    }
}

impl ReportFormatter for StructuredFormatter {
    type Output = ScanReport;

    fn format(&self, report: &ScanReport) -> Self::Output {
        report.clone()
    }
}

#[cfg(feature = "serde")]
impl ReportFormatter for JsonFormatter {
    type Output = String;

    fn format(&self, report: &ScanReport) -> Self::Output {
        serde_json::to_string(report).unwrap_or_else(|e| {
            tracing::error!(source = %report.source, error = %e, "couldn't serialize report");
            String::from("{}")
        })
    }
}
