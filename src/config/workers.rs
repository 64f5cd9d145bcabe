//! Worker-count specifier

use std::convert::Infallible;
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

/// How many worker processes to start per node, and on what device class.
///
/// Mirrors the values `torchrun --nproc_per_node` accepts. Anything else is
/// kept as [`WorkerCount::Unrecognized`] and forwarded untouched; the
/// launcher decides whether it is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerCount {
    /// One worker per GPU if any are visible, otherwise one per CPU
    Auto,
    /// One worker per CPU
    Cpu,
    /// One worker per GPU
    Gpu,
    /// Exact number of workers
    Count(NonZeroUsize),
    /// Passed through as-is
    Unrecognized(String),
}

impl WorkerCount {
    /// The worker count for a concrete integer specifier.
    pub fn count(&self) -> Option<usize> {
        match self {
            WorkerCount::Count(n) => Some(n.get()),
            _ => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, WorkerCount::Unrecognized(_))
    }
}

impl Default for WorkerCount {
    fn default() -> Self {
        WorkerCount::Count(NonZeroUsize::MIN)
    }
}

impl From<&str> for WorkerCount {
    fn from(s: &str) -> Self {
        match s {
            "auto" => WorkerCount::Auto,
            "cpu" => WorkerCount::Cpu,
            "gpu" => WorkerCount::Gpu,
            other => match other.parse::<NonZeroUsize>() {
                Ok(n) => WorkerCount::Count(n),
                Err(_) => WorkerCount::Unrecognized(other.to_string()),
            },
        }
    }
}

impl FromStr for WorkerCount {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(WorkerCount::from(s))
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerCount::Auto => f.write_str("auto"),
            WorkerCount::Cpu => f.write_str("cpu"),
            WorkerCount::Gpu => f.write_str("gpu"),
            WorkerCount::Count(n) => write!(f, "{n}"),
            WorkerCount::Unrecognized(raw) => f.write_str(raw),
        }
    }
}
