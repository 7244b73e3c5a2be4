use crate::calculator::PkCalculator;
use crate::models::{DatasetRow, ParameterStats, PkSummary, SkippedPatient, StudyResults};
use crate::Result;
use rayon::prelude::*;
use statrs::statistics::Statistics;

pub struct StudyAnalyzer;

impl StudyAnalyzer {
    /// Run the per-patient PK reduction across the whole dataset.
    ///
    /// Patient groups are independent, so the reduction fans out with rayon;
    /// collecting over the grouped order keeps results identical to the
    /// sequential calculator.
    pub fn analyze(rows: &[DatasetRow]) -> Result<StudyResults> {
        let series = PkCalculator::group_by_patient(rows);
        log::info!("Analyzing {} patients", series.len());

        let mut summaries = Vec::new();
        let mut skipped = Vec::new();

        let reductions: Vec<_> = series
            .par_iter()
            .map(|patient| (PkCalculator::summarize(patient), patient))
            .collect();

        for (summary, patient) in reductions {
            match summary {
                Some(summary) => summaries.push(summary),
                None => {
                    log::warn!(
                        "Skipping patient {}: {} valid measurements (2 required)",
                        patient.patient_id,
                        patient.len()
                    );
                    skipped.push(SkippedPatient {
                        patient_id: patient.patient_id.clone(),
                        valid_measurements: patient.len(),
                    });
                }
            }
        }

        log::info!(
            "Summarized {} patients, skipped {}",
            summaries.len(),
            skipped.len()
        );

        let parameter_stats = Self::calculate_parameter_stats(&summaries);

        Ok(StudyResults {
            summaries,
            skipped,
            parameter_stats,
        })
    }

    fn calculate_parameter_stats(summaries: &[PkSummary]) -> Vec<ParameterStats> {
        let parameters: Vec<(&str, fn(&PkSummary) -> Option<f64>)> = vec![
            ("tmax", |s| Some(s.tmax)),
            ("cmax", |s| Some(s.cmax)),
            ("auc", |s| Some(s.auc)),
            ("half_life", |s| s.half_life),
            ("clearance", |s| s.clearance),
        ];

        let mut stats = Vec::new();
        for (parameter, extractor) in parameters {
            let values: Vec<f64> = summaries.iter().filter_map(extractor).collect();
            if !values.is_empty() {
                stats.push(Self::describe(parameter, &values));
            }
        }
        stats
    }

    fn describe(parameter: &str, values: &[f64]) -> ParameterStats {
        let n = values.len();
        let mean = values.mean();
        let std_dev = if n > 1 { values.std_dev() } else { 0.0 };
        let cv_percent = if mean != 0.0 {
            (std_dev / mean) * 100.0
        } else {
            0.0
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        ParameterStats {
            parameter: parameter.to_string(),
            n,
            mean,
            std_dev,
            cv_percent,
            min: sorted[0],
            median,
            max: sorted[n - 1],
        }
    }
}
