use crate::models::{DatasetRow, Measurement, PatientSeries, PkSummary};
use itertools::Itertools;
use std::collections::HashMap;
use std::f64::consts::LN_2;

pub struct PkCalculator;

impl PkCalculator {
    /// Compute one PK summary per patient with at least two valid
    /// time/concentration pairs. Patients with fewer valid points are
    /// skipped, not errored. Output order follows the order in which
    /// patients first appear in the input.
    pub fn compute(rows: &[DatasetRow]) -> Vec<PkSummary> {
        Self::group_by_patient(rows)
            .iter()
            .filter_map(Self::summarize)
            .collect()
    }

    /// Group raw rows into per-patient series.
    ///
    /// Rows without a patient id are dropped. Rows missing time or
    /// concentration are dropped within their group. Each series is stable
    /// sorted by time, so ties keep input row order.
    pub fn group_by_patient(rows: &[DatasetRow]) -> Vec<PatientSeries> {
        let mut groups: Vec<(String, Vec<Measurement>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for row in rows {
            let Some(patient_id) = row.patient_id.as_deref() else {
                continue;
            };
            let slot = *index.entry(patient_id.to_string()).or_insert_with(|| {
                groups.push((patient_id.to_string(), Vec::new()));
                groups.len() - 1
            });
            if let (Some(time), Some(concentration)) = (row.time, row.concentration) {
                groups[slot].1.push(Measurement {
                    time,
                    concentration,
                });
            }
        }

        groups
            .into_iter()
            .map(|(patient_id, measurements)| PatientSeries::new(patient_id, measurements))
            .collect()
    }

    /// Reduce one patient's series to its PK summary.
    ///
    /// Returns `None` when the series has fewer than two measurements.
    /// Half-life comes from the log-linear slope of the final two points
    /// only, not a terminal-phase regression; clearance is the apparent
    /// Cmax/AUC value.
    pub fn summarize(series: &PatientSeries) -> Option<PkSummary> {
        let points = &series.measurements;
        if points.len() < 2 {
            return None;
        }

        let mut cmax = points[0].concentration;
        let mut tmax = points[0].time;
        for point in &points[1..] {
            // Strict comparison keeps the earliest time on ties
            if point.concentration > cmax {
                cmax = point.concentration;
                tmax = point.time;
            }
        }

        let auc: f64 = points
            .iter()
            .tuple_windows()
            .map(|(a, b)| (b.time - a.time) * (a.concentration + b.concentration) / 2.0)
            .sum();

        let last = points[points.len() - 1];
        let prev = points[points.len() - 2];
        let half_life = if last.concentration > 0.0
            && prev.concentration > 0.0
            && last.time > prev.time
        {
            let kel = (prev.concentration.ln() - last.concentration.ln()) / (last.time - prev.time);
            if kel > 0.0 {
                Some(LN_2 / kel)
            } else {
                None
            }
        } else {
            None
        };

        let clearance = if auc > 0.0 { Some(cmax / auc) } else { None };

        Some(PkSummary {
            patient_id: series.patient_id.clone(),
            tmax: round2(tmax),
            cmax: round2(cmax),
            auc: round2(auc),
            half_life: half_life.map(round2),
            clearance: clearance.map(round2),
        })
    }
}

/// Round to 2 decimal places for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
