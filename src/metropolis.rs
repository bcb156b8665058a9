/*!
# Random-Walk Metropolis Sampler

This module implements a scalar random-walk Metropolis sampler for the
posterior of a binomial success probability. The target distribution `D` and
proposal distribution `Q` are generic over the [`Target`] and
[`SymmetricProposal`] traits; because the proposal kernel is symmetric, the
acceptance rule needs no proposal-density correction.

## Overview

- **Target Distribution (`D`)**: provides the unnormalized log-density via
  [`Target`], typically a [`BetaBinomialPosterior`].
- **Proposal Distribution (`Q`)**: generates candidate states via
  [`SymmetricProposal`], typically a [`RandomWalkProposal`].
- **Reproducibility**: each chain owns a seedable generator; `set_seed`
  makes runs bit-identical.

Every chain starts at 0.5 and emits exactly one value per iteration; a
rejected proposal re-emits the previous value.

## Example Usage

```rust
use beta_mcmc::distributions::{
    BetaBinomialPosterior, BetaPrior, Observation, RandomWalkProposal,
};
use beta_mcmc::metropolis::MetropolisChain;

// Posterior after observing 4 successes in 10 trials under a flat prior.
let observation = Observation::new(4, 10)?;
let target = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
let proposal = RandomWalkProposal::new(0.16)?;

let mut chain = MetropolisChain::new(target, proposal).set_seed(42);
let sample = chain.run(1_000)?;

assert_eq!(sample.len(), 1_000);
assert_eq!(sample[0], 0.5);
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/

use indicatif::{ProgressBar, ProgressStyle};
use num_traits::Float;
use rand::prelude::*;

use crate::core::{run_chain, run_chain_with_progress, MarkovChain, Result, SamplerError};
use crate::distributions::{
    clamp_probability, BetaBinomialPosterior, BetaPrior, Observation, RandomWalkProposal,
    SymmetricProposal, Target, DEFAULT_PROPOSAL_STD,
};

/// Deterministic starting state; the first emitted sample is always this
/// value, regardless of seed.
pub const INITIAL_PROBABILITY: f64 = 0.5;

/**
A single Markov chain performing random-walk Metropolis updates.

The chain owns its target, proposal, current state, and random number
generator; nothing is shared, so independent chains can run on separate
threads without coordination.

# Type Parameters
- `T`: the floating-point type of the state (e.g. `f32` or `f64`).
- `D`: the target distribution type. Must implement [`Target`].
- `Q`: the proposal distribution type. Must implement [`SymmetricProposal`].

# Examples

```rust
use beta_mcmc::distributions::{
    BetaBinomialPosterior, BetaPrior, Observation, RandomWalkProposal,
};
use beta_mcmc::metropolis::MetropolisChain;

let observation = Observation::new(7, 12)?;
let target = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
let proposal = RandomWalkProposal::new(0.16)?;
let chain = MetropolisChain::new(target, proposal).set_seed(42);
assert_eq!(chain.seed, 42);
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/
#[derive(Debug, Clone)]
pub struct MetropolisChain<T: Float, D, Q> {
    /// The target distribution we want to sample from.
    pub target: D,
    /// The proposal distribution used to generate candidate states.
    pub proposal: Q,
    /// The current state of the chain.
    pub current_state: T,
    /// The random seed.
    pub seed: u64,
    /// The random number generator for this chain.
    pub rng: SmallRng,
}

impl<T, D, Q> MetropolisChain<T, D, Q>
where
    T: Float,
    D: Target<T>,
    Q: SymmetricProposal<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    /// Constructs a new chain at the deterministic starting state, seeded
    /// from the thread-local generator.
    pub fn new(target: D, proposal: Q) -> Self {
        let seed = thread_rng().gen::<u64>();
        Self {
            target,
            proposal,
            current_state: T::from(INITIAL_PROBABILITY).unwrap(),
            seed,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Replaces the chain's seed, making subsequent runs reproducible.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /**
    Produces `sample_count` draws, the first of which is the starting state.

    Fails with [`SamplerError::InvalidArgument`] if `sample_count` is zero.
    Otherwise the full chain is always produced: numerical edge cases inside
    the loop are resolved by the acceptance policy, never by aborting.
    */
    pub fn run(&mut self, sample_count: usize) -> Result<Vec<T>> {
        validate_sample_count(sample_count)?;
        Ok(run_chain(self, sample_count))
    }

    /// Same as [`MetropolisChain::run`], with a progress bar for long chains.
    pub fn run_progress(&mut self, sample_count: usize) -> Result<Vec<T>> {
        validate_sample_count(sample_count)?;
        let pb = ProgressBar::new(sample_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("##-"),
        );
        let out = run_chain_with_progress(self, sample_count, &pb);
        pb.finish_with_message("Done!");
        Ok(out)
    }
}

impl<T, D, Q> MarkovChain<T> for MetropolisChain<T, D, Q>
where
    T: Float,
    D: Target<T>,
    Q: SymmetricProposal<T>,
    rand_distr::Standard: rand_distr::Distribution<T>,
{
    /// Performs one Metropolis update: propose, clamp, evaluate, then accept
    /// or reject. The clamped candidate is canonical; it is what gets stored
    /// on acceptance, keeping the walk inside the unit interval.
    fn step(&mut self) -> T {
        let candidate = clamp_probability(self.proposal.sample(self.current_state, &mut self.rng));
        let current = clamp_probability(self.current_state);

        let candidate_lp = self.target.unnorm_log_prob(candidate);
        let current_lp = self.target.unnorm_log_prob(current);
        let accept_prob = acceptance_probability(candidate_lp, current_lp);

        let u: T = self.rng.gen();
        if accept_prob >= u {
            self.current_state = candidate;
        }
        self.current_state
    }

    fn current_state(&self) -> T {
        self.current_state
    }
}

/// The Metropolis acceptance probability `min(1, f(candidate) / f(current))`
/// computed from log-densities.
///
/// Degenerate ratios are resolved here instead of propagating into the
/// chain: a zero-density candidate is never taken (covering the 0/0 case),
/// and a zero-density current state is always left.
pub fn acceptance_probability<T: Float>(candidate_lp: T, current_lp: T) -> T {
    if candidate_lp == T::neg_infinity() {
        return T::zero();
    }
    if current_lp == T::neg_infinity() {
        return T::one();
    }
    (candidate_lp - current_lp).exp().min(T::one())
}

/**
Produces `sample_count` posterior draws of the success probability after
observing `successes` out of `trials`, under a flat prior and the default
proposal scale.

This is the convenience entry point; build a [`MetropolisChain`] directly to
pick a different prior or proposal scale. Pass `None` for a fresh entropy
seed, or `Some(seed)` for a reproducible run.

# Examples

```rust
use beta_mcmc::metropolis::sample_posterior;

let sample = sample_posterior(5_000, 4, 10, Some(42))?;
assert_eq!(sample.len(), 5_000);
assert_eq!(sample[0], 0.5);
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/
pub fn sample_posterior(
    sample_count: usize,
    successes: u64,
    trials: u64,
    seed: Option<u64>,
) -> Result<Vec<f64>> {
    let observation = Observation::new(successes, trials)?;
    let target = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
    let proposal = RandomWalkProposal::new(DEFAULT_PROPOSAL_STD)?;
    let mut chain = MetropolisChain::new(target, proposal);
    if let Some(seed) = seed {
        chain = chain.set_seed(seed);
    }
    chain.run(sample_count)
}

fn validate_sample_count(sample_count: usize) -> Result<()> {
    if sample_count == 0 {
        return Err(SamplerError::InvalidArgument(
            "sample count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{PROB_MAX, PROB_MIN};

    fn flat_posterior_chain(
        successes: u64,
        trials: u64,
        seed: u64,
    ) -> MetropolisChain<f64, BetaBinomialPosterior, RandomWalkProposal<f64>> {
        let observation = Observation::new(successes, trials).unwrap();
        let target = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
        let proposal = RandomWalkProposal::new(DEFAULT_PROPOSAL_STD).unwrap();
        MetropolisChain::new(target, proposal).set_seed(seed)
    }

    #[test]
    fn acceptance_probability_caps_at_one() {
        assert_eq!(acceptance_probability(0.0, 0.0), 1.0);
        assert_eq!(acceptance_probability(-1.0, -5.0), 1.0);
    }

    #[test]
    fn acceptance_probability_of_downhill_moves() {
        let p = acceptance_probability(-3.0, -1.0);
        assert!((p - (-2.0f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn zero_density_candidate_is_never_taken() {
        assert_eq!(acceptance_probability(f64::NEG_INFINITY, -1.0), 0.0);
        // The 0/0 case resolves to rejection as well.
        assert_eq!(
            acceptance_probability(f64::NEG_INFINITY, f64::NEG_INFINITY),
            0.0
        );
    }

    #[test]
    fn zero_density_state_is_always_left() {
        assert_eq!(acceptance_probability(-1.0, f64::NEG_INFINITY), 1.0);
    }

    #[test]
    fn chain_starts_at_one_half() {
        let mut chain = flat_posterior_chain(4, 10, 42);
        assert_eq!(chain.run(1).unwrap(), vec![0.5]);
    }

    #[test]
    fn requesting_zero_samples_is_invalid() {
        let mut chain = flat_posterior_chain(4, 10, 42);
        assert!(matches!(
            chain.run(0),
            Err(SamplerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn same_seed_produces_bit_identical_chains() {
        let a = flat_posterior_chain(4, 10, 7).run(500).unwrap();
        let b = flat_posterior_chain(4, 10, 7).run(500).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn samples_stay_inside_the_evaluation_interval() {
        let sample = flat_posterior_chain(4, 10, 3).run(2_000).unwrap();
        assert!(sample
            .iter()
            .all(|&x| (PROB_MIN..=PROB_MAX).contains(&x)));
    }

    #[test]
    fn rejected_steps_repeat_the_previous_value() {
        // Continuous proposals almost surely never coincide, so equal
        // neighbors are exactly the rejected steps.
        let sample = flat_posterior_chain(4, 10, 3).run(2_000).unwrap();
        let rejections = sample.windows(2).filter(|w| w[0] == w[1]).count();
        let moves = sample.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(rejections > 0, "expected at least one rejected proposal");
        assert!(moves > 0, "expected at least one accepted proposal");
    }

    #[test]
    fn run_progress_matches_run() {
        let with_progress = flat_posterior_chain(4, 10, 11)
            .run_progress(300)
            .unwrap();
        let plain = flat_posterior_chain(4, 10, 11).run(300).unwrap();
        assert_eq!(with_progress, plain);
    }

    #[test]
    fn sample_posterior_is_reproducible() {
        let a = sample_posterior(200, 4, 10, Some(42)).unwrap();
        let b = sample_posterior(200, 4, 10, Some(42)).unwrap();
        assert_eq!(a.len(), 200);
        assert_eq!(a[0], 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn sample_posterior_validates_inputs() {
        assert!(matches!(
            sample_posterior(0, 4, 10, None),
            Err(SamplerError::InvalidArgument(_))
        ));
        assert!(matches!(
            sample_posterior(100, 11, 10, None),
            Err(SamplerError::InvalidArgument(_))
        ));
        assert!(matches!(
            sample_posterior(100, 4, 0, None),
            Err(SamplerError::InvalidArgument(_))
        ));
    }
}
