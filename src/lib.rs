#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Correction of observed sequence tag counts for misread error.
//! Short degenerate tags (e.g. sequencing barcodes) are sometimes misread as
//! similar neighbor tags, so the observed counts are a noisy, biased estimate
//! of the true counts. Given a neighbor probability graph describing the
//! misread process, the corrector searches for a set of estimated true counts
//! whose expected observed counts match the real observations as closely as
//! possible.

/// Iterative expectation-matching correction of observed counts
pub mod corrector;
/// Dense per-tag count vectors
pub mod counts;
/// Sorted bit-packed tag dictionary
pub mod dict;
/// Crate error type
pub mod error;
/// Forward simulation of the misread process
pub mod expectation;
/// On-disk neighbor probability graph
pub mod graph;

/// Nucleotide alphabet used
pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, crate::error::Error>;
