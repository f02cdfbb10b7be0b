//! Reporting and persistence for probe results.
//!
//! Results are surfaced three ways: a structured tracing summary for live
//! comparison, pretty JSON for inspection, and CSV append so runs can be
//! diffed across sessions.

use anyhow::Result;
use tracing::{debug, info};

use crate::probe::ProbeResult;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs one line per result plus a closing success count, in executed order.
pub fn print_summary(results: &[ProbeResult]) {
    for r in results {
        info!(
            label = %r.label,
            order = ?r.order,
            status = r.status,
            success = r.success,
            error = r.error.as_deref().unwrap_or(""),
            "Probe result"
        );
        if let Some(sample) = &r.sample {
            info!(label = %r.label, sample = %sample, "Sample record");
        }
    }

    let accepted = results.iter().filter(|r| r.success).count();
    info!(total = results.len(), accepted, "Matrix complete");
}

/// Logs the full result log as pretty-printed JSON.
pub fn print_json(results: &[ProbeResult]) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

/// Appends each [`ProbeResult`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records(path: &str, results: &[ProbeResult]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for result in results {
        writer.serialize(result)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::KeyOrder;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_result(label: &str) -> ProbeResult {
        ProbeResult {
            label: label.to_string(),
            order: KeyOrder::Insertion,
            canonical: "routeName=33&dir=0".to_string(),
            token: "t".repeat(44),
            status: None,
            success: false,
            sample: None,
            error: Some("connection refused".to_string()),
        }
    }

    #[test]
    fn test_print_summary_does_not_panic() {
        print_summary(&[sample_result("a"), sample_result("b")]);
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&[sample_result("a")]).unwrap();
    }

    #[test]
    fn test_append_records_creates_file() {
        let path = temp_path("bus_token_probe_test_create.csv");
        let _ = fs::remove_file(&path); // clean up any prior run

        append_records(&path, &[sample_result("a")]).unwrap();

        assert!(Path::new(&path).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("connection refused"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("bus_token_probe_test_header.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[sample_result("a")]).unwrap();
        append_records(&path, &[sample_result("b")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("canonical")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_one_row_per_result() {
        let path = temp_path("bus_token_probe_test_rows.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &[sample_result("a"), sample_result("b")]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // 1 header + 2 data rows
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }
}
