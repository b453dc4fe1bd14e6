//! Validate all candidate intervals over multiple threads
//!

use std::error;
use std::sync::mpsc::{Sender, channel};
use std::time::{Duration, Instant};

use camino::Utf8Path;
use log::{debug, info};
use rust_vc_utils::ChromList;
use simple_error::{SimpleResult, map_err_with};
use thousands::Separable;

use crate::alignment_source::{AlignmentSource, register_samples};
use crate::candidate_input::{CandidateInterval, CandidateReader, CandidateRecord};
use crate::cli::{SharedSettings, ValidateSettings};
use crate::run_stats::{ValidateRunStats, write_validate_run_stats};
use crate::validate_cnv::{
    CandidateOutcome, ValidateCnvSettings, summarize_candidate, validate_candidate,
};
use crate::validated_cnv_output::ValidatedCnvWriter;
use crate::worker_thread_data::{ValidationWorkerThreadDataSet, get_validation_worker_thread_data};

/// Number of candidates read into memory and validated together
///
/// Results are written in input order after each batch completes.
///
const CANDIDATE_BATCH_SIZE: usize = 2000;

type ValidateWorkerReturnType = (usize, Duration, SimpleResult<CandidateOutcome>);

fn validate_candidate_wrapper<S: AlignmentSource>(
    worker_thread_dataset: &ValidationWorkerThreadDataSet<S>,
    tx: Sender<ValidateWorkerReturnType>,
    settings: &ValidateCnvSettings,
    chrom_list: &ChromList,
    candidate_index: usize,
    candidate: &CandidateInterval,
) {
    let candidate_start_time = Instant::now();

    let worker_id = rayon::current_thread_index().unwrap();

    let mut worker_data = worker_thread_dataset[worker_id].lock().unwrap();
    let worker_data = &mut *worker_data;

    let outcome = validate_candidate(
        settings,
        chrom_list,
        candidate,
        &mut worker_data.sources,
        &mut worker_data.scratch,
    );

    let result = (candidate_index, candidate_start_time.elapsed(), outcome);
    tx.send(result).unwrap();
}

/// Validate one batch of candidates on the worker pool
///
/// Returns results in the same order as `candidates`
///
fn validate_candidate_batch<S: AlignmentSource + Send>(
    worker_pool: &rayon::ThreadPool,
    worker_thread_dataset: &ValidationWorkerThreadDataSet<S>,
    settings: &ValidateCnvSettings,
    chrom_list: &ChromList,
    candidates: &[CandidateInterval],
    run_stats: &mut ValidateRunStats,
) -> Vec<SimpleResult<CandidateOutcome>> {
    let (tx, rx) = channel();
    worker_pool.scope(move |scope| {
        for (candidate_index, candidate) in candidates.iter().enumerate() {
            let tx = tx.clone();
            scope.spawn(move |_| {
                validate_candidate_wrapper(
                    worker_thread_dataset,
                    tx,
                    settings,
                    chrom_list,
                    candidate_index,
                    candidate,
                );
            });
        }
    });

    let mut results = rx.into_iter().collect::<Vec<_>>();
    results.sort_by_key(|x| x.0);
    results
        .into_iter()
        .map(|(_, duration, outcome)| {
            run_stats.total_validation_time_secs += duration.as_secs_f64();
            outcome
        })
        .collect()
}

/// Read the next batch of supported candidate intervals
///
/// Returns an empty batch at the end of input
///
fn read_candidate_batch(
    reader: &mut CandidateReader,
    run_stats: &mut ValidateRunStats,
) -> SimpleResult<Vec<CandidateInterval>> {
    let mut candidates = Vec::new();
    while candidates.len() < CANDIDATE_BATCH_SIZE {
        let candidate = match reader.next_candidate()? {
            Some(x) => x,
            None => break,
        };
        run_stats.candidate_stats.candidate_input_count += 1;
        match candidate {
            CandidateRecord::Interval(x) => candidates.push(x),
            CandidateRecord::UnsupportedType => {
                run_stats.candidate_stats.unsupported_type_count += 1;
            }
        }
    }
    Ok(candidates)
}

/// Update stats and write output for each candidate outcome, in input order
///
fn write_candidate_batch(
    settings: &ValidateCnvSettings,
    candidates: Vec<CandidateInterval>,
    outcomes: Vec<SimpleResult<CandidateOutcome>>,
    writer: &mut ValidatedCnvWriter,
    run_stats: &mut ValidateRunStats,
) -> SimpleResult<()> {
    for (candidate, outcome) in candidates.into_iter().zip(outcomes) {
        match outcome? {
            CandidateOutcome::Skipped(reason) => {
                debug!(
                    "Skipping candidate {}:{}-{}: {reason}",
                    candidate.chrom, candidate.start, candidate.end
                );
                run_stats.candidate_stats.add_skip(reason);
            }
            CandidateOutcome::Genotyped(calls) => {
                run_stats
                    .genotype_stats
                    .add_calls(&calls, settings.min_read_support);
                match summarize_candidate(&candidate, calls) {
                    Some(summary) => {
                        writer.write_summary(&summary)?;
                        run_stats.candidate_stats.vcf_output_record_count += 1;
                    }
                    None => {
                        run_stats.candidate_stats.no_alt_allele_count += 1;
                    }
                }
            }
        }
    }
    Ok(())
}

fn get_chrom_list(ref_filename: &Utf8Path) -> SimpleResult<ChromList> {
    let chrom_list = map_err_with!(
        ChromList::from_fasta_index(ref_filename),
        "Can't read fasta index for reference file: '{}'",
        ref_filename
    )?;
    info!(
        "Read {} chromosomes from reference fasta index",
        chrom_list.data.len()
    );
    Ok(chrom_list)
}

/// Validate all candidates from the input and write validated candidates to the output VCF
///
pub fn run_validate_cnv(
    shared_settings: &SharedSettings,
    settings: &ValidateSettings,
) -> Result<(), Box<dyn error::Error>> {
    let ref_filename = Utf8Path::new(&settings.ref_filename);
    let cnv_settings = &settings.get_validate_cnv_settings();

    let chrom_list = &get_chrom_list(ref_filename)?;

    let samples = register_samples(&settings.bam_filenames, ref_filename)?;
    let sample_names = samples
        .iter()
        .map(|x| x.sample_name.as_str())
        .collect::<Vec<_>>();

    let worker_thread_dataset = &get_validation_worker_thread_data(
        shared_settings.thread_count,
        &samples,
        ref_filename,
    )?;

    let worker_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(shared_settings.thread_count)
        .build()
        .unwrap();

    let mut reader = CandidateReader::new(&settings.input_filename)?;
    let mut writer = ValidatedCnvWriter::new(
        &settings.output_filename,
        ref_filename,
        chrom_list,
        &sample_names,
        cnv_settings.min_read_support,
    )?;

    info!("Starting candidate validation");
    let mut run_stats = ValidateRunStats::default();
    loop {
        let candidates = read_candidate_batch(&mut reader, &mut run_stats)?;
        if candidates.is_empty() {
            break;
        }
        let outcomes = validate_candidate_batch(
            &worker_pool,
            worker_thread_dataset,
            cnv_settings,
            chrom_list,
            &candidates,
            &mut run_stats,
        );
        write_candidate_batch(
            cnv_settings,
            candidates,
            outcomes,
            &mut writer,
            &mut run_stats,
        )?;
        info!(
            "Processed {} candidate records",
            run_stats
                .candidate_stats
                .candidate_input_count
                .separate_with_commas()
        );
    }
    info!("Finished validating all candidates");

    run_stats.log_summary();
    if let Some(stats_filename) = &settings.stats_filename {
        write_validate_run_stats(stats_filename, &run_stats);
    }

    Ok(())
}
