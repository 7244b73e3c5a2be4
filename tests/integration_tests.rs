use pk_analysis::{
    errors::PkError, example_data::ExampleDataGenerator, output::OutputManager,
    parser::DatasetParser, population::StudyAnalyzer,
};
use approx::assert_relative_eq;
use std::io::Write;
use tempfile::TempDir;

#[test]
fn test_complete_pk_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let temp_path = temp_dir.path();

    let dataset_path = temp_path.join("example_dataset.csv");
    ExampleDataGenerator::generate_dataset(&dataset_path, 6).unwrap();

    let rows = DatasetParser::parse_dataset(&dataset_path).unwrap();
    let results = StudyAnalyzer::analyze(&rows).unwrap();
    assert_eq!(results.summaries.len(), 6);
    assert!(!results.parameter_stats.is_empty());

    let output_path = temp_path.join("pk_output");
    OutputManager::save_results(&results, &output_path).unwrap();

    assert!(output_path.join("pk_results.csv").exists());
    assert!(output_path.join("pk_results.json").exists());
    assert!(output_path.join("analysis_report.txt").exists());
}

#[test]
fn test_summary_csv_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let dataset_path = temp_dir.path().join("dataset.csv");

    let mut file = std::fs::File::create(&dataset_path).unwrap();
    writeln!(file, "PatientID,Time,Concentration").unwrap();
    writeln!(file, "P1,0,0").unwrap();
    writeln!(file, "P1,1,10").unwrap();
    writeln!(file, "P1,2,5").unwrap();
    writeln!(file, "P3,0,5").unwrap();
    writeln!(file, "P3,1,0").unwrap();
    drop(file);

    let rows = DatasetParser::parse_dataset(&dataset_path).unwrap();
    let results = StudyAnalyzer::analyze(&rows).unwrap();

    let summary_path = temp_dir.path().join("pk_results.csv");
    OutputManager::save_summary_csv(&results.summaries, &summary_path).unwrap();
    let reloaded = OutputManager::load_summary_csv(&summary_path).unwrap();

    assert_eq!(reloaded, results.summaries);

    let p1 = &reloaded[0];
    assert_eq!(p1.patient_id, "P1");
    assert_relative_eq!(p1.tmax, 1.0);
    assert_relative_eq!(p1.cmax, 10.0);
    assert_relative_eq!(p1.auc, 12.5);
    assert_relative_eq!(p1.half_life.unwrap(), 1.0);
    assert_relative_eq!(p1.clearance.unwrap(), 0.8);

    let p3 = &reloaded[1];
    assert_eq!(p3.half_life, None);
    assert_relative_eq!(p3.auc, 2.5);
    assert_relative_eq!(p3.clearance.unwrap(), 2.0);
}

#[test]
fn test_missing_column_is_a_schema_error() {
    let temp_dir = TempDir::new().unwrap();
    let dataset_path = temp_dir.path().join("bad.csv");

    let mut file = std::fs::File::create(&dataset_path).unwrap();
    writeln!(file, "PatientID,Time").unwrap();
    writeln!(file, "P1,0").unwrap();
    drop(file);

    let err = DatasetParser::parse_dataset(&dataset_path).unwrap_err();
    assert!(err.to_string().contains("Concentration"));
    match err {
        PkError::MissingColumns(columns) => {
            assert_eq!(columns, vec!["Concentration".to_string()]);
        }
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_blank_cells_drop_rows_not_the_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let dataset_path = temp_dir.path().join("sparse.csv");

    let mut file = std::fs::File::create(&dataset_path).unwrap();
    writeln!(file, "PatientID,Time,Concentration").unwrap();
    writeln!(file, "P1,0,4").unwrap();
    writeln!(file, "P1,1,").unwrap();
    writeln!(file, "P1,2,2").unwrap();
    writeln!(file, ",3,1").unwrap();
    writeln!(file, "P2,0,9").unwrap();
    drop(file);

    let rows = DatasetParser::parse_dataset(&dataset_path).unwrap();
    assert_eq!(rows.len(), 5);

    let results = StudyAnalyzer::analyze(&rows).unwrap();
    // P1 keeps its two complete rows; P2 is left with one and is skipped
    assert_eq!(results.summaries.len(), 1);
    assert_relative_eq!(results.summaries[0].auc, 6.0);
    assert_eq!(results.skipped.len(), 1);
    assert_eq!(results.skipped[0].patient_id, "P2");
}

#[test]
fn test_extra_columns_and_order_are_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let dataset_path = temp_dir.path().join("wide.csv");

    let mut file = std::fs::File::create(&dataset_path).unwrap();
    writeln!(file, "Site,Concentration,PatientID,Time").unwrap();
    writeln!(file, "S1,10,P1,1").unwrap();
    writeln!(file, "S1,5,P1,2").unwrap();
    drop(file);

    let rows = DatasetParser::parse_dataset(&dataset_path).unwrap();
    let results = StudyAnalyzer::analyze(&rows).unwrap();
    assert_eq!(results.summaries.len(), 1);
    assert_relative_eq!(results.summaries[0].cmax, 10.0);
    assert_relative_eq!(results.summaries[0].auc, 7.5);
}
