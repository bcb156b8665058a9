//! # beta-mcmc
//!
//! A compact Rust library for random-walk Metropolis sampling of the
//! posterior of a binomial success probability under a Beta prior.
//!
//! The sampler is a single scalar Markov chain: propose a Gaussian step,
//! clamp it into the open unit interval, and accept or reject by the
//! Metropolis criterion. Chains are seedable for reproducible runs.
//!
//! ## Getting Started
//!
//! ```rust
//! use beta_mcmc::metropolis::sample_posterior;
//!
//! // Posterior draws after observing 4 successes in 10 trials.
//! let sample = sample_posterior(5_000, 4, 10, Some(42)).unwrap();
//! assert_eq!(sample.len(), 5_000);
//! assert_eq!(sample[0], 0.5);
//! ```
//!
//! For a non-flat prior or a different proposal scale, build a
//! [`metropolis::MetropolisChain`] from the pieces in [`distributions`].

pub mod core;
pub mod distributions;
pub mod metropolis;
pub mod stats;
