use serde::{Deserialize, Serialize};

/// One raw row of the input dataset. Any field may be missing; the
/// calculator drops incomplete rows rather than erroring on them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetRow {
    pub patient_id: Option<String>,
    pub time: Option<f64>,
    pub concentration: Option<f64>,
}

/// A single valid time/concentration observation. Immutable once parsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub time: f64,
    pub concentration: f64,
}

/// All measurements for one patient, sorted ascending by time.
///
/// The sort is stable: rows sharing a time keep their original relative
/// order. Duplicate times are permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSeries {
    pub patient_id: String,
    pub measurements: Vec<Measurement>,
}

impl PatientSeries {
    pub fn new(patient_id: String, mut measurements: Vec<Measurement>) -> Self {
        measurements.sort_by(|a, b| {
            a.time
                .partial_cmp(&b.time)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self {
            patient_id,
            measurements,
        }
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

/// PK summary parameters for one patient.
///
/// `tmax`, `cmax` and `auc` are always computable for an emitted summary and
/// are rounded to 2 decimals. `half_life` and `clearance` are `None` when
/// not applicable (non-positive terminal concentrations, non-positive
/// elimination rate, zero AUC); a `None` here is an explicit marker, never a
/// NaN stand-in.
///
/// Clearance is the apparent value `cmax / auc`. Dose is not part of the
/// input schema, so the dose-normalized definition is not computable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PkSummary {
    pub patient_id: String,
    pub tmax: f64,
    pub cmax: f64,
    pub auc: f64,
    pub half_life: Option<f64>,
    pub clearance: Option<f64>,
}

/// A patient excluded from the summary table for lack of data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedPatient {
    pub patient_id: String,
    pub valid_measurements: usize,
}

/// Descriptive statistics for one PK parameter across the study population.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterStats {
    pub parameter: String,
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub cv_percent: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Complete output of a study-level analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyResults {
    pub summaries: Vec<PkSummary>,
    pub skipped: Vec<SkippedPatient>,
    pub parameter_stats: Vec<ParameterStats>,
}
