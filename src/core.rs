//! Chain abstractions shared by the sampler: the [`MarkovChain`] trait, the
//! functions that materialize a chain into an owned sample buffer, and the
//! crate's error type.

use indicatif::ProgressBar;
use std::error::Error;
use std::fmt;

/// Errors reported by the sampler before any sampling work begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerError {
    /// A precondition on the sampler inputs was violated.
    InvalidArgument(String),
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
        }
    }
}

impl Error for SamplerError {}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SamplerError>;

/// A Markov chain over a scalar state.
pub trait MarkovChain<S> {
    /// Does one iteration of the chain, returning the new current state.
    fn step(&mut self) -> S;

    /// Returns the current state without stepping.
    fn current_state(&self) -> S;
}

/// Runs `chain` until `n_steps` states have been collected.
///
/// The chain's current state is recorded as the first element, so the buffer
/// holds the initial state followed by `n_steps - 1` transitions. The buffer
/// is allocated once and filled strictly left to right.
pub fn run_chain<S, M>(chain: &mut M, n_steps: usize) -> Vec<S>
where
    M: MarkovChain<S>,
    S: Copy,
{
    let mut out = Vec::with_capacity(n_steps);
    if n_steps == 0 {
        return out;
    }
    out.push(chain.current_state());
    for _ in 1..n_steps {
        out.push(chain.step());
    }
    out
}

/// Same as [`run_chain`], updating `pb` once per collected state.
pub fn run_chain_with_progress<S, M>(chain: &mut M, n_steps: usize, pb: &ProgressBar) -> Vec<S>
where
    M: MarkovChain<S>,
    S: Copy,
{
    let mut out = Vec::with_capacity(n_steps);
    if n_steps == 0 {
        return out;
    }

    pb.set_length(n_steps as u64);
    out.push(chain.current_state());
    pb.inc(1);

    for _ in 1..n_steps {
        out.push(chain.step());
        pb.inc(1);
    }

    out
}
