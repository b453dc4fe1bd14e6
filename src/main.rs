mod alignment_source;
mod candidate_input;
mod clip_evidence;
mod cli;
mod coverage;
mod depth_genotype;
mod depth_normalization;
mod globals;
mod logger;
mod os_utils;
mod run_median;
mod run_stats;
mod run_validation;
mod validate_cnv;
mod validated_cnv_output;
mod vcf_utils;
mod worker_thread_data;

use std::{error, process};

use hhmmss::Hhmmss;
use log::info;

use crate::alignment_source::SampleRegistrationError;
use crate::globals::{PROGRAM_NAME, PROGRAM_VERSION};
use crate::logger::setup_logger;
use crate::run_validation::run_validate_cnv;

/// Run system configuration steps prior to starting any other program logic
///
fn system_configuration_prelude() {
    os_utils::attempt_max_open_file_limit();
}

fn run(settings: &cli::Settings) -> Result<(), Box<dyn error::Error>> {
    info!("Starting {PROGRAM_NAME} {PROGRAM_VERSION}");
    info!(
        "cmdline: {}",
        std::env::args().collect::<Vec<_>>().join(" ")
    );
    info!("Running on {} threads", settings.shared.thread_count);

    let start = std::time::Instant::now();

    run_validate_cnv(&settings.shared, &settings.validate)?;

    info!(
        "{PROGRAM_NAME} completed. Total Runtime: {}",
        start.elapsed().hhmmssxxx()
    );
    Ok(())
}

fn main() {
    system_configuration_prelude();

    let settings = cli::validate_and_fix_settings(cli::parse_settings());

    if let Err(err) = setup_logger(settings.shared.debug) {
        eprintln!("Can't initialize logger: {err}");
        process::exit(2);
    }

    if let Err(err) = run(&settings) {
        eprintln!("{err}");
        let exit_code = match err.downcast_ref::<SampleRegistrationError>() {
            Some(x) => x.exit_code(),
            None => 2,
        };
        process::exit(exit_code);
    }
}
