use crate::counts::TagCounts;
use crate::error::Error;
use crate::graph::GraphReader;
use std::io::{Read, Seek};

type Result<T> = std::result::Result<T, Error>;

/// Simulates the forward misread process: what counts would be observed if a
/// hypothetical vector of true counts were read through the error model of a
/// neighbor probability graph.
#[derive(Debug)]
pub struct ExpectationComputer<'g, R: Read + Seek> {
    graph: &'g mut GraphReader<R>,
}

impl<'g, R: Read + Seek> ExpectationComputer<'g, R> {
    /// Borrows the graph cursor for the lifetime of the computer. Every
    /// computation performs its own private, complete, rewind-to-end pass, so
    /// no two passes ever interleave on the shared cursor.
    pub fn new(graph: &'g mut GraphReader<R>) -> Self {
        Self { graph }
    }

    /// Declared tag universe size of the underlying graph
    pub fn universe(&self) -> usize {
        self.graph.universe()
    }

    fn check_len(&self, counts: &TagCounts) -> Result<()> {
        if counts.len() != self.universe() {
            return Err(Error::LengthMismatch(counts.len(), self.universe()));
        }
        Ok(())
    }

    /// Sets `observed[j]` to the mean count of tag `j` under the error model:
    /// one full graph pass accumulating `true_counts[i] * p` over every edge
    /// `(i, j, p)`. This realizes `observed = P · true` for the row-sparse
    /// confusion matrix `P` without materializing it.
    pub fn mean_counts(&mut self, true_counts: &TagCounts, observed: &mut TagCounts) -> Result<()> {
        self.check_len(true_counts)?;
        self.check_len(observed)?;

        observed.zero();
        self.graph.rewind()?;
        loop {
            let row = self.graph.row();
            let true_count = true_counts[row.id() as usize];
            for neighbor in row.neighbors() {
                observed[neighbor.id as usize] += true_count * neighbor.prob;
            }
            if !self.graph.advance()? {
                break;
            }
        }
        Ok(())
    }

    /// Sets `variances[j]` to the variance of the count of tag `j`, treating
    /// each of the `true_counts[i]` reads as an independent Bernoulli trial
    /// landing on `j` with probability `p`: accumulates
    /// `true_counts[i] * p * (1 - p)` over the same traversal.
    pub fn variance_counts(
        &mut self,
        true_counts: &TagCounts,
        variances: &mut TagCounts,
    ) -> Result<()> {
        self.check_len(true_counts)?;
        self.check_len(variances)?;

        variances.zero();
        self.graph.rewind()?;
        loop {
            let row = self.graph.row();
            let true_count = true_counts[row.id() as usize];
            for neighbor in row.neighbors() {
                variances[neighbor.id as usize] +=
                    true_count * neighbor.prob * (1.0 - neighbor.prob);
            }
            if !self.graph.advance()? {
                break;
            }
        }
        Ok(())
    }
}
