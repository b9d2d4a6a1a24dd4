//! Aggregates raw process records into per-identity usage

use crate::collector::{CollectError, ProcessCollector, RawProcess};
use crate::ranker::{rank, RankedEntry};
use std::collections::HashMap;
use tracing::debug;

pub const UNKNOWN_IDENTITY: &str = "unknown";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSample {
    pub identity: String,
    pub memory_mb: f64,
    pub cpu_percent: f64,
    /// PID of the largest single-process memory contributor.
    pub representative_pid: u32,
}

impl ProcessSample {
    pub fn new(identity: impl Into<String>, memory_mb: f64, cpu_percent: f64, pid: u32) -> Self {
        Self {
            identity: identity.into(),
            memory_mb,
            cpu_percent,
            representative_pid: pid,
        }
    }
}

/// A sample under construction plus the largest contribution seen so far.
struct Bucket {
    sample: ProcessSample,
    largest_mb: f64,
}

impl Bucket {
    fn absorb(&mut self, memory_mb: f64, cpu_percent: f64, pid: u32) {
        self.sample.memory_mb += memory_mb;
        self.sample.cpu_percent += cpu_percent;
        if memory_mb > self.largest_mb {
            self.largest_mb = memory_mb;
            self.sample.representative_pid = pid;
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    pub split_unnamed: bool,
}

impl Sampler {
    pub fn new(split_unnamed: bool) -> Self {
        Self { split_unnamed }
    }

    fn identity_for(&self, process: &RawProcess) -> String {
        match process.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ if self.split_unnamed => format!("{}:{}", UNKNOWN_IDENTITY, process.pid),
            _ => UNKNOWN_IDENTITY.to_string(),
        }
    }

    /// Queries the collector once and merges same-identity processes.
    /// Output keeps first-seen order.
    pub fn sample(&self, collector: &dyn ProcessCollector) -> Vec<ProcessSample> {
        self.aggregate(collector.snapshot())
    }

    pub fn aggregate(
        &self,
        records: impl IntoIterator<Item = Result<RawProcess, CollectError>>,
    ) -> Vec<ProcessSample> {
        let mut buckets: Vec<Bucket> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            let process = match record {
                Ok(process) => process,
                Err(e) => {
                    debug!("Skipping process: {}", e);
                    skipped += 1;
                    continue;
                }
            };
            let identity = self.identity_for(&process);
            let memory_mb = process.resident_memory_bytes as f64 / BYTES_PER_MB;
            let cpu_percent = process.cpu_percent.max(0.0);

            match index.get(&identity) {
                Some(&i) => buckets[i].absorb(memory_mb, cpu_percent, process.pid),
                None => {
                    index.insert(identity.clone(), buckets.len());
                    buckets.push(Bucket {
                        sample: ProcessSample::new(identity, memory_mb, cpu_percent, process.pid),
                        largest_mb: memory_mb,
                    });
                }
            }
        }

        let samples: Vec<ProcessSample> = buckets.into_iter().map(|b| b.sample).collect();
        debug!("Sampled {} identities ({} records skipped)", samples.len(), skipped);
        samples
    }

    /// Sampling followed by ranking.
    pub fn sample_top(
        &self,
        collector: &dyn ProcessCollector,
        min_mb: f64,
        limit: usize,
    ) -> Vec<RankedEntry> {
        rank(self.sample(collector), min_mb, limit)
    }
}
