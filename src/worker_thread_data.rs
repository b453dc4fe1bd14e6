use std::sync::{Arc, Mutex};

use camino::Utf8Path;

use crate::alignment_source::{BamAlignmentSource, SampleInfo, SampleRegistrationError};
use crate::validate_cnv::DepthScratch;

/// For worker threads making indexed alignment reads, this provides a persistent worker specific
/// reader for each sample, together with the worker's depth buffers
pub struct ValidationWorkerThreadData<S = BamAlignmentSource> {
    pub sources: Vec<S>,
    pub scratch: DepthScratch,
}

impl<S> ValidationWorkerThreadData<S> {
    pub fn from_sources(sources: Vec<S>) -> Self {
        Self {
            sources,
            scratch: DepthScratch::default(),
        }
    }
}

impl ValidationWorkerThreadData {
    pub fn new(
        samples: &[SampleInfo],
        ref_filename: &Utf8Path,
    ) -> Result<Self, SampleRegistrationError> {
        let sources = samples
            .iter()
            .map(|x| BamAlignmentSource::new(x, ref_filename))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_sources(sources))
    }
}

pub type ValidationWorkerThreadDataSet<S = BamAlignmentSource> =
    Arc<Vec<Mutex<ValidationWorkerThreadData<S>>>>;

pub fn get_validation_worker_thread_data(
    thread_count: usize,
    samples: &[SampleInfo],
    ref_filename: &Utf8Path,
) -> Result<ValidationWorkerThreadDataSet, SampleRegistrationError> {
    let mut worker_thread_data = Vec::new();
    for _ in 0..thread_count {
        worker_thread_data.push(Mutex::new(ValidationWorkerThreadData::new(
            samples,
            ref_filename,
        )?));
    }
    Ok(Arc::new(worker_thread_data))
}
