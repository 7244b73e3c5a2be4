use anyhow::Context;
use clap::{Arg, Command};
use pk_analysis::{
    example_data::ExampleDataGenerator, output::OutputManager, parser::DatasetParser,
    population::StudyAnalyzer,
};
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = Command::new("PK Parameter Calculator")
        .version("1.0")
        .about("Per-patient pharmacokinetic summary parameters from concentration-time data")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input CSV with PatientID, Time and Concentration columns")
                .required_unless_present("generate-example"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for results")
                .default_value("./pk_results"),
        )
        .arg(
            Arg::new("generate-example")
                .long("generate-example")
                .help("Generate an example dataset and analyze it")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("patients")
                .short('n')
                .long("patients")
                .value_name("NUMBER")
                .help("Number of patients for the example dataset")
                .default_value("12"),
        )
        .get_matches();

    let output_dir = PathBuf::from(matches.get_one::<String>("output").unwrap());

    if matches.get_flag("generate-example") {
        let n_patients: usize = matches
            .get_one::<String>("patients")
            .unwrap()
            .parse()
            .context("Invalid number of patients")?;

        std::fs::create_dir_all(&output_dir)?;
        let example_file = output_dir.join("example_dataset.csv");
        ExampleDataGenerator::generate_dataset(&example_file, n_patients)?;
        println!("Generated example dataset: {}", example_file.display());

        if !matches.contains_id("input") {
            return run_analysis(&example_file, &output_dir);
        }
    }

    if let Some(input_file) = matches.get_one::<String>("input") {
        run_analysis(&PathBuf::from(input_file), &output_dir)
    } else {
        println!("No input file specified. Use --generate-example to create sample data.");
        Ok(())
    }
}

fn run_analysis(input_path: &PathBuf, output_dir: &PathBuf) -> anyhow::Result<()> {
    println!("Input file: {}", input_path.display());
    println!("Output directory: {}", output_dir.display());

    let rows = DatasetParser::parse_dataset(input_path)
        .with_context(|| format!("Failed to read dataset {}", input_path.display()))?;

    let start_time = std::time::Instant::now();
    let results = StudyAnalyzer::analyze(&rows)?;
    let duration = start_time.elapsed();

    OutputManager::save_results(&results, output_dir).context("Failed to save results")?;

    println!();
    print!("{}", OutputManager::format_table(&results.summaries));
    println!();
    println!("Patients summarized: {}", results.summaries.len());
    if !results.skipped.is_empty() {
        println!(
            "Patients skipped (fewer than 2 valid points): {}",
            results.skipped.len()
        );
    }
    println!("Analysis completed in {:.3} seconds", duration.as_secs_f64());
    println!("Results saved to {}", output_dir.display());

    Ok(())
}
