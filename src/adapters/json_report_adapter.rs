//! Pretty-printed JSON report writer.

use crate::domain::error::AlgolabError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;
use std::fs;
use tracing::info;

#[derive(Debug, Default)]
pub struct JsonReportAdapter;

impl JsonReportAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn render(report: &BacktestReport) -> Result<String, AlgolabError> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

impl ReportPort for JsonReportAdapter {
    fn write(&self, report: &BacktestReport, output_path: &str) -> Result<(), AlgolabError> {
        let content = Self::render(report)?;
        fs::write(output_path, content).map_err(|e| AlgolabError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })?;
        info!(path = output_path, runs = report.runs.len(), "report written");
        Ok(())
    }
}
