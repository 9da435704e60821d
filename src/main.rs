//! Ordercast: Order Cancellation Prediction CLI
//!
//! Loads the seven relational extracts, runs the preparation and training
//! pipeline once, and prints the evaluation summary.

use anyhow::Result;
use clap::Parser;

use ordercast::cli::Cli;
use ordercast::pipeline::{self, SeedStrategy};
use ordercast::report::{print_confusion_matrix, print_cv_table, print_final_summary, write_run_report};
use ordercast::utils::{print_banner, print_completion, print_config, print_success};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();

    print_banner(env!("CARGO_PKG_VERSION"));

    let seed_label = match config.seed {
        SeedStrategy::Fixed(seed) => seed.to_string(),
        SeedStrategy::TimeDerived => "time-derived".to_string(),
    };
    print_config(
        &config.data_dir,
        &seed_label,
        config.test_fraction,
        config.smote_ratio,
        config.cv_folds,
    );

    let outcome = pipeline::run(&config)?;

    print_cv_table(&outcome.cv_accuracy);
    print_confusion_matrix(&outcome.evaluation);
    print_final_summary(&outcome.evaluation);

    if let Some(path) = &cli.export_report {
        write_run_report(path, &outcome)?;
        print_success(&format!("Run report saved to {}", path.display()));
    }

    print_completion();
    Ok(())
}
