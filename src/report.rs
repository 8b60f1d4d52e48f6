//! Rendering of the final reconciliation report

use std::fmt::Write as _;
use std::path::Path;

use crate::engine::ReconciliationReport;
use crate::error::{ReconcilerError, Result};

/// Human-readable summary: filtered updates, actions taken, and log entries
pub fn render(report: &ReconciliationReport) -> Result<String> {
    let mut out = String::new();

    writeln!(
        out,
        "Filtered Updates: {} unique and non-redundant updates.",
        report.filtered_updates.len()
    )
    .map_err(fmt_err)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&report.filtered_updates)?).map_err(fmt_err)?;

    writeln!(out, "\nActions Taken:").map_err(fmt_err)?;
    for action in &report.actions_taken {
        writeln!(out, "{action}").map_err(fmt_err)?;
    }

    writeln!(out, "\nExample Log Entries for Updater:").map_err(fmt_err)?;
    for entry in &report.log_entries {
        writeln!(
            out,
            "Update sent to order book at {} for ClientID {}: {}",
            entry.timestamp,
            entry.client_id,
            serde_json::to_string(entry)?
        )
        .map_err(fmt_err)?;
    }

    Ok(out)
}

/// Write the full report as pretty JSON
pub fn write_json(report: &ReconciliationReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .map_err(|e| ReconcilerError::ReportError(format!("{}: {}", path.display(), e)))
}

fn fmt_err(e: std::fmt::Error) -> ReconcilerError {
    ReconcilerError::ReportError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ReconciliationEngine;
    use crate::parser::{Notification, OrderStatus, PriceType};

    fn report() -> ReconciliationReport {
        let mut engine = ReconciliationEngine::new(95055780);
        engine.handle(
            Notification::new(1111075078, PriceType::Limit, OrderStatus::Cancelled)
                .with_generated_at("17-10-2026 09:15:02"),
        );
        engine.handle(Notification::new(1111075079, PriceType::Market, OrderStatus::Cancelled));
        engine.into_report()
    }

    #[test]
    fn test_render_sections() {
        let text = render(&report()).unwrap();
        assert!(text.starts_with("Filtered Updates: 2 unique and non-redundant updates."));
        assert!(text.contains("For AppOrderID: 1111075078 : cancelOrder"));
        assert!(!text.contains("For AppOrderID: 1111075079"));
        let stamped = crate::engine::normalize_timestamp("17-10-2026 09:15:02", chrono::Utc::now());
        assert!(text.contains(&format!(
            "Update sent to order book at {stamped} for ClientID 95055780: "
        )));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json(&report(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["filtered_updates"].as_array().unwrap().len(), 2);
        assert_eq!(value["actions_taken"][0]["action"], "cancelOrder");
        assert_eq!(value["log_entries"][0]["clientID"], 95055780);
        assert_eq!(value["stats"]["cancelled"], 1);
    }
}
