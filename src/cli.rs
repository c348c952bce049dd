//! Command-line interface for the GPA prediction pipeline.

use std::error::Error;
use std::path::Path;

use crate::config::Config;
use crate::data::GPA_RANGE;
use crate::predict::predict_single;
use crate::simulate;
use crate::train::train_model;

/// Print command-line usage information.
pub fn print_usage() {
    println!("Usage:");
    println!("  gradepoint [COMMAND] [ARGS]\n");
    println!("Commands:");
    println!("  generate           Generate the synthetic student dataset (saves to data/)");
    println!("  train              Train the GPA models (saves artifacts to models/)");
    println!("  predict JSON       Predict one student's GPA (requires trained artifacts)");
    println!("  help               Show this help\n");
    println!("Examples:");
    println!("  gradepoint generate");
    println!("  gradepoint train");
    println!(
        "  gradepoint predict '{{\"major\":\"人工智能学院\",\"gender\":1,\"attendance\":30,\
         \"homework_completion\":0.98,\"lib_borrow\":4,\"club_participation\":1,\
         \"class_interaction\":18,\"exam_score\":95}}'"
    );
}

/// Main entry point for the CLI.
pub fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
    let command = args.get(1).map(String::as_str).unwrap_or("help");

    match command {
        "generate" => {
            let config = Config::load_or_default();
            let records = simulate::generate_records(
                config.simulate.samples,
                config.simulate.seed,
                config.simulate.noise_std,
            );
            let path = Path::new(&config.data.csv_path);
            simulate::write_dataset(&records, path)?;

            let mean = records.iter().map(|r| r.gpa).sum::<f64>() / records.len() as f64;
            println!("Dataset written: {}", path.display());
            println!("  Rows: {}", records.len());
            println!(
                "  GPA mean {:.2} (range {:.1}-{:.1})",
                mean, GPA_RANGE.0, GPA_RANGE.1
            );
            Ok(())
        }
        "train" => {
            let config = Config::load_or_default();
            train_model(&config)?;
            Ok(())
        }
        "predict" => {
            let Some(input) = args.get(2) else {
                println!("Error: JSON argument required\n");
                print_usage();
                return Ok(());
            };
            let config = Config::load_or_default();
            predict_single(input, Path::new(&config.output.model_dir))?;
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            println!("Unknown command: {command}\n");
            print_usage();
            Ok(())
        }
    }
}
