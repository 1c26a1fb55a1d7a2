// src/output.rs
use crate::scanner::ScanSummary;
use crate::types::{ScanReport, SifError};
use std::io::Write;

/// Console side of a scan. API mode prints one JSON document per target and
/// nothing else; interactive mode prints short per-target and final summaries.
#[derive(Debug, Clone)]
pub struct OutputManager {
    api_mode: bool,
}

impl OutputManager {
    pub fn new(api_mode: bool) -> Self {
        Self { api_mode }
    }

    pub fn write_report(&self, report: &ScanReport) -> Result<(), SifError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_report_to(&mut handle, report)
    }

    pub fn write_report_to<W: Write>(
        &self,
        writer: &mut W,
        report: &ScanReport,
    ) -> Result<(), SifError> {
        if self.api_mode {
            let json = serde_json::to_string(report)
                .map_err(|e| SifError::Output(format!("Failed to serialize JSON: {}", e)))?;
            writeln!(writer, "{}", json).map_err(|e| SifError::Output(e.to_string()))?;
            return Ok(());
        }

        writeln!(writer, "\n[*] Target: {}", report.url)
            .map_err(|e| SifError::Output(e.to_string()))?;
        for module in &report.results {
            let count = module.data.as_array().map(|a| a.len()).unwrap_or(0);
            writeln!(writer, "[*] {}: {} findings", module.id, count)
                .map_err(|e| SifError::Output(e.to_string()))?;
        }

        Ok(())
    }

    pub fn write_summary(&self, summary: &ScanSummary) -> Result<(), SifError> {
        if self.api_mode {
            return Ok(());
        }
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.write_summary_to(&mut handle, summary)
    }

    pub fn write_summary_to<W: Write>(
        &self,
        writer: &mut W,
        summary: &ScanSummary,
    ) -> Result<(), SifError> {
        writeln!(writer, "\n🌿 All scans completed in {:.2}s!", summary.duration.as_secs_f64())
            .map_err(|e| SifError::Output(e.to_string()))?;

        if !summary.log_files.is_empty() {
            let files: Vec<String> = summary
                .log_files
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            writeln!(writer, "📂 Output saved to files: {}", files.join(", "))
                .map_err(|e| SifError::Output(e.to_string()))?;
        }

        writeln!(writer, "\n🔍 Ran scans:").map_err(|e| SifError::Output(e.to_string()))?;
        for module in &summary.modules_run {
            writeln!(writer, "  • {}", module).map_err(|e| SifError::Output(e.to_string()))?;
        }

        Ok(())
    }
}
