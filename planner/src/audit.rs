//! JSONL audit trail logging.
//!
//! Commands that change a fund or compute a contribution plan append one
//! JSON object per line to the audit file.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use glidepath::{FundConfig, RebalancePlan};
use serde::Serialize;

use crate::error::Result;

/// An audit event written to the JSONL trail.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event: &'static str,
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub data: serde_json::Value,
}

/// Append-only audit logger.
pub struct AuditLog {
    writer: BufWriter<std::fs::File>,
}

impl AuditLog {
    /// Open (or create) the audit log file for appending.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Log an event with arbitrary JSON data.
    pub fn log(&mut self, event: &'static str, data: serde_json::Value) -> Result<()> {
        let entry = AuditEvent {
            event,
            ts: Utc::now(),
            data,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        writeln!(self.writer, "{json}")?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Convenience: log a newly created fund.
pub fn log_fund_created(audit: &mut AuditLog, fund_id: &str, fund_name: &str) -> Result<()> {
    audit.log(
        "fund_created",
        serde_json::json!({
            "fund_id": fund_id,
            "fund_name": fund_name,
        }),
    )
}

/// Convenience: log a saved configuration.
pub fn log_config_saved(audit: &mut AuditLog, fund_id: &str, config: &FundConfig) -> Result<()> {
    let classes: Vec<_> = config
        .asset_classes
        .iter()
        .map(|(class, funds)| {
            serde_json::json!({
                "asset_class": class.as_str(),
                "funds": funds.iter().map(|f| f.symbol.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();

    audit.log(
        "config_saved",
        serde_json::json!({
            "fund_id": fund_id,
            "birth_year": config.birth_year,
            "asset_classes": classes,
            "glide_path_rows": config.glide_path.len(),
        }),
    )
}

/// Convenience: log a computed contribution plan.
pub fn log_rebalance(audit: &mut AuditLog, fund_id: &str, plan: &RebalancePlan) -> Result<()> {
    let funds: Vec<_> = plan
        .funds
        .iter()
        .map(|f| {
            serde_json::json!({
                "symbol": f.symbol.as_str(),
                "current": f.current,
                "desired": f.desired,
                "needed": f.needed,
                "invest": f.invest,
            })
        })
        .collect();

    audit.log(
        "rebalance_computed",
        serde_json::json!({
            "fund_id": fund_id,
            "age": plan.age,
            "cash_to_invest": plan.cash_to_invest,
            "total_value": plan.total_value,
            "outcome": plan.outcome,
            "funds": funds,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audit_log_writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test_audit.jsonl");

        {
            let mut log = AuditLog::open(&path).unwrap();
            log_fund_created(&mut log, "My_Fund", "My Fund").unwrap();
            log.log("test_data", serde_json::json!({"key": "value"}))
                .unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for line in &lines {
            let _: serde_json::Value = serde_json::from_str(line).unwrap();
        }

        assert!(lines[0].contains("\"event\":\"fund_created\""));
        assert!(lines[0].contains("\"fund_id\":\"My_Fund\""));
    }

    #[test]
    fn audit_log_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        for _ in 0..2 {
            let mut log = AuditLog::open(&path).unwrap();
            log_config_saved(&mut log, "f", &FundConfig::new("F")).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let first: serde_json::Value = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(first["birth_year"], 1990);
        assert_eq!(first["asset_classes"].as_array().unwrap().len(), 5);
    }

    #[test]
    fn audit_log_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subdir").join("deep").join("audit.jsonl");

        let mut log = AuditLog::open(&path).unwrap();
        log.log("test", serde_json::json!({})).unwrap();

        assert!(path.exists());
    }
}
