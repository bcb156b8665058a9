/*!
Defines the target and proposal distributions for the scalar Metropolis
sampler: a Beta prior, the Beta-Binomial posterior built from it, and a
Gaussian random-walk proposal, along with the traits that connect them to the
sampler.

The module is generic over the floating-point precision (e.g., `f32` or
`f64`) using the [`num_traits::Float`] trait. Density parameters are held in
`f64`; only the chain state is generic.

# Examples

```rust
use beta_mcmc::distributions::{BetaBinomialPosterior, BetaPrior, Observation, Target};

// Posterior after observing 4 successes in 10 trials under a flat prior.
let observation = Observation::new(4, 10)?;
let posterior = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
let lp: f64 = posterior.unnorm_log_prob(0.5);
println!("Log-density at 0.5: {lp}");
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/

use num_traits::{Float, ToPrimitive};
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use crate::core::{Result, SamplerError};

/// Lower edge of the interval in which probability values are evaluated.
/// Densities degenerate at the exact boundaries 0 and 1, so candidates are
/// pinned just inside.
pub const PROB_MIN: f64 = 1e-3;

/// Upper edge of the evaluation interval, mirroring [`PROB_MIN`].
pub const PROB_MAX: f64 = 1.0 - PROB_MIN;

/// Default standard deviation of the random-walk proposal step.
pub const DEFAULT_PROPOSAL_STD: f64 = 0.16;

/// A trait for continuous target distributions from which we want to sample.
/// The state is a single probability value.
pub trait Target<T: Float> {
    /// Returns the log of the unnormalized density at `theta`.
    fn unnorm_log_prob(&self, theta: T) -> T;
}

/// A trait for generating candidate states in a Metropolis sampler.
///
/// Implementations must be symmetric, `q(x' | x) = q(x | x')`, which is what
/// lets the acceptance rule skip the proposal-density correction. The caller
/// passes its own generator so that chains never share random state.
pub trait SymmetricProposal<T: Float> {
    /// Draws a new candidate from q(x' | x).
    fn sample(&self, current: T, rng: &mut SmallRng) -> T;
}

/// Clamps a probability into `[PROB_MIN, PROB_MAX]`.
///
/// Both clamp sites in the sampler (the fresh candidate and the state it is
/// compared against) go through this one function, and the clamped candidate
/// is the value that gets stored on acceptance.
pub fn clamp_probability<T: Float>(x: T) -> T {
    let lo = T::from(PROB_MIN).unwrap();
    let hi = T::from(PROB_MAX).unwrap();
    x.max(lo).min(hi)
}

/// Natural log of the gamma function via the Lanczos approximation (g=7).
pub fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Reflection formula: Γ(x) = π / (sin(πx) · Γ(1-x))
        return (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = 0.99999999999980993;
    for (i, &c) in COEFFS.iter().enumerate() {
        acc += c / (x + (i + 1) as f64);
    }
    let t = x + 7.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/**
A Beta(α, β) prior over the success probability, evaluated pointwise.

The flat prior Beta(1, 1) contributes a constant log-density of zero, so the
posterior reduces to the Binomial likelihood; keeping the factor explicit
lets an informative prior be swapped in without touching the sampler.

# Examples

```rust
use beta_mcmc::distributions::BetaPrior;

let flat = BetaPrior::flat();
assert_eq!(flat.unnorm_log_density(0.3), 0.0);

let informative = BetaPrior::new(2.0, 5.0)?;
assert!(informative.unnorm_log_density(0.2) > informative.unnorm_log_density(0.8));
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaPrior {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaPrior {
    /// Creates a Beta(α, β) prior. Both parameters must be positive and finite.
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if !(alpha.is_finite() && alpha > 0.0 && beta.is_finite() && beta > 0.0) {
            return Err(SamplerError::InvalidArgument(format!(
                "beta prior parameters must be positive and finite, got ({alpha}, {beta})"
            )));
        }
        Ok(Self { alpha, beta })
    }

    /// The flat prior Beta(1, 1), uniform on (0, 1).
    pub fn flat() -> Self {
        Self {
            alpha: 1.0,
            beta: 1.0,
        }
    }

    /// Log of the unnormalized density at `p`. Callers must keep `p` strictly
    /// inside (0, 1).
    pub fn unnorm_log_density(&self, p: f64) -> f64 {
        (self.alpha - 1.0) * p.ln() + (self.beta - 1.0) * (1.0 - p).ln()
    }
}

/// The observed trial data: an immutable pair of counts, fixed for the
/// lifetime of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub successes: u64,
    pub trials: u64,
}

impl Observation {
    /// Validates `successes <= trials` and `trials > 0`.
    pub fn new(successes: u64, trials: u64) -> Result<Self> {
        if trials == 0 {
            return Err(SamplerError::InvalidArgument(
                "trial count must be positive".to_string(),
            ));
        }
        if successes > trials {
            return Err(SamplerError::InvalidArgument(format!(
                "successes ({successes}) must not exceed trials ({trials})"
            )));
        }
        Ok(Self { successes, trials })
    }

    /// Number of failed trials.
    pub fn failures(&self) -> u64 {
        self.trials - self.successes
    }
}

/**
The unnormalized posterior of a binomial success probability: a [`BetaPrior`]
times the Binomial(trials, p) likelihood of the observed successes.

The binomial coefficient is constant in `p` and cancels in acceptance ratios,
but it is precomputed and included so that the log-density matches the exact
joint log-probability.

# Examples

```rust
use beta_mcmc::distributions::{BetaBinomialPosterior, BetaPrior, Observation, Target};

let observation = Observation::new(4, 10)?;
let posterior = BetaBinomialPosterior::new(BetaPrior::flat(), observation);

// With a flat prior this is exactly the Binomial log-pmf.
let lp: f64 = posterior.unnorm_log_prob(0.5);
assert!((lp - (210.0f64 / 1024.0).ln()).abs() < 1e-12);
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaBinomialPosterior {
    pub prior: BetaPrior,
    pub observation: Observation,
    ln_choose: f64,
}

impl BetaBinomialPosterior {
    /// Builds the posterior for a fixed prior and observation.
    pub fn new(prior: BetaPrior, observation: Observation) -> Self {
        let n = observation.trials as f64;
        let k = observation.successes as f64;
        let ln_choose = ln_gamma(n + 1.0) - ln_gamma(k + 1.0) - ln_gamma(n - k + 1.0);
        Self {
            prior,
            observation,
            ln_choose,
        }
    }
}

impl<T: Float> Target<T> for BetaBinomialPosterior {
    fn unnorm_log_prob(&self, theta: T) -> T {
        let p = theta.to_f64().unwrap();
        // The support is the open unit interval; everything outside carries
        // zero density.
        if !(0.0 < p && p < 1.0) {
            return T::neg_infinity();
        }
        let successes = self.observation.successes as f64;
        let failures = self.observation.failures() as f64;
        let log_likelihood = self.ln_choose + successes * p.ln() + failures * (1.0 - p).ln();
        T::from(self.prior.unnorm_log_density(p) + log_likelihood).unwrap()
    }
}

/**
A Gaussian random-walk proposal: candidates are the current state plus
zero-mean Gaussian noise with standard deviation `std`.

The kernel is symmetric by construction. The scale is fixed for the lifetime
of a chain; it is not adapted during sampling.

# Examples

```rust
use beta_mcmc::distributions::{RandomWalkProposal, SymmetricProposal};
use rand::rngs::SmallRng;
use rand::SeedableRng;

let proposal = RandomWalkProposal::new(0.16)?;
let mut rng = SmallRng::seed_from_u64(42);
let candidate: f64 = proposal.sample(0.5, &mut rng);
println!("Candidate state: {candidate}");
# Ok::<(), beta_mcmc::core::SamplerError>(())
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomWalkProposal<T: Float> {
    pub std: T,
}

impl<T: Float> RandomWalkProposal<T> {
    /// Creates a random-walk proposal with the specified step standard
    /// deviation, which must be positive and finite.
    pub fn new(std: T) -> Result<Self> {
        if !(std.is_finite() && std > T::zero()) {
            return Err(SamplerError::InvalidArgument(
                "proposal standard deviation must be positive and finite".to_string(),
            ));
        }
        Ok(Self { std })
    }
}

impl<T: Float> SymmetricProposal<T> for RandomWalkProposal<T>
where
    rand_distr::StandardNormal: rand_distr::Distribution<T>,
{
    fn sample(&self, current: T, rng: &mut SmallRng) -> T {
        let normal = Normal::new(T::zero(), self.std)
            .expect("Expected creation of normal distribution to succeed.");
        current + normal.sample(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn ln_gamma_matches_factorials() {
        const TOL: f64 = 1e-10;
        assert!(ln_gamma(1.0).abs() < TOL); // 0! = 1
        assert!(ln_gamma(2.0).abs() < TOL); // 1! = 1
        assert!((ln_gamma(5.0) - 24.0f64.ln()).abs() < TOL); // 4! = 24
        assert!((ln_gamma(11.0) - 3_628_800.0f64.ln()).abs() < TOL); // 10!
    }

    #[test]
    fn ln_gamma_at_half() {
        // Γ(1/2) = √π
        assert_abs_diff_eq!(ln_gamma(0.5), 0.5 * PI.ln(), epsilon = 1e-10);
    }

    #[test]
    fn binomial_log_pmf_is_exact() {
        let observation = Observation::new(4, 10).unwrap();
        let posterior = BetaBinomialPosterior::new(BetaPrior::flat(), observation);

        // P(X = 4 | n = 10, p = 0.5) = C(10,4) / 2^10 = 210 / 1024
        let lp: f64 = posterior.unnorm_log_prob(0.5);
        assert_abs_diff_eq!(lp, (210.0f64 / 1024.0).ln(), epsilon = 1e-12);

        // P(X = 4 | n = 10, p = 0.3) = C(10,4) · 0.3^4 · 0.7^6
        let lp: f64 = posterior.unnorm_log_prob(0.3);
        let expected = 210.0 * 0.3f64.powi(4) * 0.7f64.powi(6);
        assert_abs_diff_eq!(lp.exp(), expected, epsilon = 1e-12);
    }

    #[test]
    fn flat_prior_contributes_nothing() {
        let flat = BetaPrior::flat();
        for p in [0.001, 0.25, 0.5, 0.999] {
            assert_eq!(flat.unnorm_log_density(p), 0.0);
        }
    }

    #[test]
    fn informative_prior_tilts_the_density() {
        // Beta(2, 1) has unnormalized log-density ln(p).
        let prior = BetaPrior::new(2.0, 1.0).unwrap();
        assert_abs_diff_eq!(prior.unnorm_log_density(0.4), 0.4f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn posterior_has_zero_density_outside_unit_interval() {
        let observation = Observation::new(4, 10).unwrap();
        let posterior = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
        for p in [0.0, 1.0, -0.2, 1.3] {
            let lp: f64 = posterior.unnorm_log_prob(p);
            assert_eq!(lp, f64::NEG_INFINITY);
        }
    }

    #[test]
    fn clamp_pins_to_evaluation_interval() {
        assert_eq!(clamp_probability(-0.5), PROB_MIN);
        assert_eq!(clamp_probability(2.0), PROB_MAX);
        assert_eq!(clamp_probability(0.42), 0.42);
    }

    #[test]
    fn observation_rejects_invalid_counts() {
        assert!(Observation::new(4, 0).is_err());
        assert!(Observation::new(11, 10).is_err());

        let observation = Observation::new(4, 10).unwrap();
        assert_eq!(observation.successes, 4);
        assert_eq!(observation.trials, 10);
        assert_eq!(observation.failures(), 6);
    }

    #[test]
    fn prior_rejects_invalid_parameters() {
        assert!(BetaPrior::new(0.0, 1.0).is_err());
        assert!(BetaPrior::new(1.0, -2.0).is_err());
        assert!(BetaPrior::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn proposal_rejects_invalid_scale() {
        assert!(RandomWalkProposal::new(0.0).is_err());
        assert!(RandomWalkProposal::new(-0.16).is_err());
        assert!(RandomWalkProposal::new(f64::NAN).is_err());
        assert!(RandomWalkProposal::new(f64::INFINITY).is_err());
    }

    #[test]
    fn proposal_is_deterministic_under_a_fixed_seed() {
        let proposal = RandomWalkProposal::new(0.16).unwrap();
        let mut rng_a = SmallRng::seed_from_u64(42);
        let mut rng_b = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let a: f64 = proposal.sample(0.5, &mut rng_a);
            let b: f64 = proposal.sample(0.5, &mut rng_b);
            assert_eq!(a, b);
        }
    }
}
