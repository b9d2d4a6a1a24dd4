//! Process enumeration (reads /proc on Linux)

mod linux;

pub use linux::LinuxProcessCollector;

use thiserror::Error;

/// One live process as reported by the OS, before any aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProcess {
    pub name: Option<String>,
    pub pid: u32,
    pub resident_memory_bytes: u64,
    pub cpu_percent: f64,
}

/// Per-record failures. Both are expected races with the OS and are
/// skipped by the sampler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CollectError {
    #[error("process {0} vanished")]
    Vanished(u32),
    #[error("access denied to process {0}")]
    AccessDenied(u32),
}

pub trait ProcessCollector {
    /// Enumerates every live process once.
    fn snapshot(&self) -> Vec<Result<RawProcess, CollectError>>;
}
