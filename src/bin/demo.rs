//! A small demo sampling the posterior success probability for a binomial
//! experiment, then printing summary statistics next to the analytic
//! conjugate posterior.

use beta_mcmc::distributions::{
    BetaBinomialPosterior, BetaPrior, Observation, RandomWalkProposal, DEFAULT_PROPOSAL_STD,
};
use beta_mcmc::metropolis::MetropolisChain;
use beta_mcmc::stats::ChainTracker;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    const SAMPLE_COUNT: usize = 50_000;
    const BURNIN: usize = 5_000;
    const SUCCESSES: u64 = 4;
    const TRIALS: u64 = 10;
    const SEED: u64 = 42;

    let observation = Observation::new(SUCCESSES, TRIALS)?;
    let target = BetaBinomialPosterior::new(BetaPrior::flat(), observation);
    let proposal = RandomWalkProposal::new(DEFAULT_PROPOSAL_STD)?;
    let mut chain = MetropolisChain::new(target, proposal).set_seed(SEED);

    let sample = chain.run_progress(SAMPLE_COUNT)?;
    println!(
        "Generated {} samples for {SUCCESSES}/{TRIALS} successes",
        sample.len()
    );

    let mut tracker = ChainTracker::new(sample[BURNIN]);
    for &x in &sample[BURNIN + 1..] {
        tracker.step(x);
    }
    let stats = tracker.stats();

    // Beta(alpha + successes, beta + failures) is the conjugate posterior.
    let alpha = 1.0 + SUCCESSES as f64;
    let beta = 1.0 + (TRIALS - SUCCESSES) as f64;
    let analytic_mean = alpha / (alpha + beta);
    let analytic_var = alpha * beta / ((alpha + beta).powi(2) * (alpha + beta + 1.0));

    println!(
        "Posterior mean after burn-in: {:.4} (analytic {:.4})",
        stats.mean, analytic_mean
    );
    println!(
        "Posterior variance: {:.5} (analytic {:.5})",
        stats.sm2, analytic_var
    );
    println!("Recent acceptance rate: {:.2}", stats.p_accept);

    Ok(())
}
