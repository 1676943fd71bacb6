use crate::counts::TagCounts;
use crate::error::Error;
use crate::expectation::ExpectationComputer;
use log::debug;
use std::io::{Read, Seek};
use std::mem;

type Result<T> = std::result::Result<T, Error>;

/// Default number of iterations to wait for an improvement before giving up
pub const DEFAULT_ROUNDS_TO_WAIT: usize = 10;

/// Corrects observed tag counts by searching for estimated true counts whose
/// expected observed counts under the error model match the real observations
/// as closely as possible.
///
/// Each iteration simulates the forward model on the current estimate and adds
/// the residual against the real observations back onto the estimate; the
/// residual measures how far the estimate's forward image is from what was
/// observed, so the update is a fixed-point step toward consistency. The
/// search keeps the best iterate seen and stops only after a configured
/// number of rounds without improvement, which tolerates the non-monotonic
/// convergence the update can exhibit.
#[derive(Debug)]
pub struct Corrector<'a, 'g, R: Read + Seek> {
    computer: &'a mut ExpectationComputer<'g, R>,
    observed: &'a TagCounts,
    rounds_to_wait: usize,
    expected: TagCounts,
    latest: TagCounts,
    prior: TagCounts,
    best_error: f64,
    best_counts: TagCounts,
    best_iteration: usize,
    iterations: usize,
}

impl<'a, 'g, R: Read + Seek> Corrector<'a, 'g, R> {
    /// Seeds the search with the observed counts themselves, i.e. the
    /// no-error hypothesis. Errors when the observed vector's length differs
    /// from the graph's declared tag universe size.
    pub fn new(
        computer: &'a mut ExpectationComputer<'g, R>,
        observed: &'a TagCounts,
        rounds_to_wait: usize,
    ) -> Result<Self> {
        if observed.len() != computer.universe() {
            return Err(Error::LengthMismatch(observed.len(), computer.universe()));
        }

        let len = observed.len();
        Ok(Self {
            expected: TagCounts::zeros(len),
            latest: TagCounts::zeros(len),
            prior: observed.clone(),
            best_error: f64::MAX,
            best_counts: TagCounts::zeros(len),
            best_iteration: 0,
            iterations: 0,
            computer,
            observed,
            rounds_to_wait,
        })
    }

    /// Configured patience
    pub fn rounds_to_wait(&self) -> usize {
        self.rounds_to_wait
    }

    /// Runs the iterative search to one of its terminal conditions. The
    /// search (re)starts from the no-error hypothesis each time.
    pub fn infer(&mut self) -> Result<()> {
        self.prior.assign(self.observed)?;
        self.best_error = f64::MAX;
        self.best_iteration = 0;

        let mut iteration = 0;
        while iteration <= self.best_iteration + self.rounds_to_wait {
            self.computer.mean_counts(&self.prior, &mut self.expected)?;

            for i in 0..self.latest.len() {
                self.latest[i] = self.prior[i] + self.observed[i] - self.expected[i];
            }

            let delta = TagCounts::max_abs_diff(&self.prior, &self.latest)?;
            if delta < self.best_error {
                self.best_error = delta;
                self.best_iteration = iteration;
                self.best_counts.assign(&self.latest)?;
            }
            debug!("Iteration {} moved the estimate by {}", iteration, delta);

            mem::swap(&mut self.prior, &mut self.latest);
            iteration += 1;
        }
        self.iterations = iteration;

        Ok(())
    }

    /// The best estimate seen over the whole search, not the final iterate;
    /// intermediate iterates can be transiently worse
    pub fn best_counts(&self) -> &TagCounts {
        &self.best_counts
    }

    /// Largest single-tag move of the iteration that produced the best estimate
    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    /// Iteration index at which the best estimate was recorded
    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    /// Number of iterations the search ran before stopping
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}
