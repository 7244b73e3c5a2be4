use crate::models::{PkSummary, StudyResults};
use crate::{errors::PkError, Result};
use csv::ReaderBuilder;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Token written to exported tables where a parameter is not applicable.
pub const NOT_APPLICABLE: &str = "N/A";

const SUMMARY_HEADER: &str = "PatientID,Tmax,Cmax,AUC,Half-life,Clearance";

pub struct OutputManager;

impl OutputManager {
    pub fn save_results<P: AsRef<Path>>(results: &StudyResults, output_path: P) -> Result<()> {
        let output_dir = output_path.as_ref();
        fs::create_dir_all(output_dir)?;

        Self::save_summary_csv(&results.summaries, &output_dir.join("pk_results.csv"))?;
        Self::save_json_results(results, output_dir)?;
        Self::generate_analysis_report(results, output_dir)?;

        log::info!("Results saved to: {}", output_dir.display());
        Ok(())
    }

    /// Write the summary table as delimited text, one row per patient.
    pub fn save_summary_csv<P: AsRef<Path>>(summaries: &[PkSummary], path: P) -> Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", SUMMARY_HEADER)?;
        for summary in summaries {
            writeln!(
                file,
                "{},{},{},{},{},{}",
                summary.patient_id,
                summary.tmax,
                summary.cmax,
                summary.auc,
                format_optional(summary.half_life),
                format_optional(summary.clearance),
            )?;
        }
        Ok(())
    }

    /// Re-parse an exported summary table, mapping the N/A token back to an
    /// absent value.
    pub fn load_summary_csv<P: AsRef<Path>>(path: P) -> Result<Vec<PkSummary>> {
        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

        let mut summaries = Vec::new();
        for result in reader.records() {
            let record = result?;
            summaries.push(PkSummary {
                patient_id: field(&record, 0)?.to_string(),
                tmax: parse_value(field(&record, 1)?)?,
                cmax: parse_value(field(&record, 2)?)?,
                auc: parse_value(field(&record, 3)?)?,
                half_life: parse_optional(field(&record, 4)?)?,
                clearance: parse_optional(field(&record, 5)?)?,
            });
        }
        Ok(summaries)
    }

    fn save_json_results(results: &StudyResults, output_dir: &Path) -> Result<()> {
        let file_path = output_dir.join("pk_results.json");
        let json_string = serde_json::to_string_pretty(results)?;
        fs::write(file_path, json_string)?;
        Ok(())
    }

    fn generate_analysis_report(results: &StudyResults, output_dir: &Path) -> Result<()> {
        let file_path = output_dir.join("analysis_report.txt");
        let mut file = File::create(file_path)?;

        writeln!(file, "PHARMACOKINETIC PARAMETER ANALYSIS REPORT")?;
        writeln!(file, "=========================================")?;
        writeln!(file, "Generated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file)?;

        writeln!(file, "Patients summarized: {}", results.summaries.len())?;
        if !results.skipped.is_empty() {
            writeln!(file, "Patients skipped (fewer than 2 valid points):")?;
            for skip in &results.skipped {
                writeln!(
                    file,
                    "- {} ({} valid measurements)",
                    skip.patient_id, skip.valid_measurements
                )?;
            }
        }
        writeln!(file)?;

        writeln!(file, "Parameter statistics across patients:")?;
        writeln!(file, "PARAMETER    N     MEAN      SD        CV%       MIN       MEDIAN    MAX")?;
        for stats in &results.parameter_stats {
            writeln!(
                file,
                "{:<12} {:<5} {:<9.3} {:<9.3} {:<9.1} {:<9.3} {:<9.3} {:<9.3}",
                stats.parameter,
                stats.n,
                stats.mean,
                stats.std_dev,
                stats.cv_percent,
                stats.min,
                stats.median,
                stats.max,
            )?;
        }

        Ok(())
    }

    /// Render the summary table for terminal display.
    pub fn format_table(summaries: &[PkSummary]) -> String {
        let header = ["PatientID", "Tmax", "Cmax", "AUC", "Half-life", "Clearance"];
        let rows: Vec<[String; 6]> = summaries
            .iter()
            .map(|s| {
                [
                    s.patient_id.clone(),
                    s.tmax.to_string(),
                    s.cmax.to_string(),
                    s.auc.to_string(),
                    format_optional(s.half_life),
                    format_optional(s.clearance),
                ]
            })
            .collect();

        let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let mut out = String::new();
        for (&width, title) in widths.iter().zip(header) {
            out.push_str(&format!("{:<w$}  ", title, w = width));
        }
        out.push('\n');
        for row in &rows {
            for (&width, cell) in widths.iter().zip(row) {
                out.push_str(&format!("{:<w$}  ", cell, w = width));
            }
            out.push('\n');
        }
        out
    }
}

fn field<'r>(record: &'r csv::StringRecord, idx: usize) -> Result<&'r str> {
    record
        .get(idx)
        .ok_or_else(|| PkError::Parse("Truncated summary row".to_string()))
}

fn format_optional(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => NOT_APPLICABLE.to_string(),
    }
}

fn parse_value(raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| PkError::Parse(format!("Invalid numeric value '{}' in summary table", raw)))
}

fn parse_optional(raw: &str) -> Result<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed == NOT_APPLICABLE {
        Ok(None)
    } else {
        parse_value(trimmed).map(Some)
    }
}
