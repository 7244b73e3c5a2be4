use crate::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub struct ExampleDataGenerator;

const SAMPLING_TIMES: [f64; 10] = [0.0, 0.25, 0.5, 1.0, 2.0, 4.0, 6.0, 8.0, 12.0, 24.0];

impl ExampleDataGenerator {
    /// Write a synthetic `PatientID,Time,Concentration` dataset of
    /// one-compartment oral absorption profiles.
    pub fn generate_dataset<P: AsRef<Path>>(output_path: P, n_patients: usize) -> Result<()> {
        let mut rng = StdRng::seed_from_u64(42); // Reproducible results
        let mut file = File::create(output_path)?;

        writeln!(file, "PatientID,Time,Concentration")?;

        for patient in 1..=n_patients {
            let patient_id = format!("P{:02}", patient);

            // Population parameters with inter-patient variability
            let dose = 100.0;
            let ka = rng.gen_range(0.8..2.0);
            let ke = rng.gen_range(0.08..0.25);
            let vd = rng.gen_range(30.0..70.0);

            for time in SAMPLING_TIMES {
                // Leave the occasional cell blank so missing-value handling
                // is exercised end to end
                if rng.gen_bool(0.02) {
                    writeln!(file, "{},{},", patient_id, time)?;
                    continue;
                }

                let concentration = Self::oral_concentration(time, dose, ka, ke, vd);
                let observed = (concentration * rng.gen_range(0.85..1.15)).max(0.0);
                writeln!(file, "{},{},{:.4}", patient_id, time, observed)?;
            }
        }

        log::info!("Generated example dataset with {} patients", n_patients);
        Ok(())
    }

    // One-compartment oral model: C = (Dose*ka/(Vd*(ka-ke))) * (e^-ke*t - e^-ka*t)
    fn oral_concentration(time: f64, dose: f64, ka: f64, ke: f64, vd: f64) -> f64 {
        if (ka - ke).abs() < 1e-9 {
            return (dose / vd) * ka * time * (-ke * time).exp();
        }
        (dose * ka) / (vd * (ka - ke)) * ((-ke * time).exp() - (-ka * time).exp())
    }
}
