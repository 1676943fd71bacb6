use crate::dict::TagDict;
use crate::error::Error;
use log::debug;
use std::io::{BufRead, Write};
use std::ops::{Index, IndexMut};

type Result<T> = std::result::Result<T, Error>;

/// Dense vector of per-tag counts, index aligned with the tag ids of the
/// dictionary it was built against. Sized once at construction and never
/// resized; two vectors only combine when their lengths agree.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCounts {
    counts: Vec<f64>,
}

impl TagCounts {
    /// A zeroed vector of the given length
    pub fn zeros(len: usize) -> Self {
        Self {
            counts: vec![0.0; len],
        }
    }

    /// Reads a counts file holding one `<tag><TAB><count>` pair per line.
    /// Tags missing from the file keep a count of zero. A line without exactly
    /// two fields, or naming a tag absent from the dictionary, is an error.
    pub fn from_reader<R: BufRead>(dict: &TagDict, rdr: R) -> Result<Self> {
        let mut counts = Self::zeros(dict.len());

        for line in rdr.lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if line.contains("\t\t") {
                return Err(Error::DoubleTab(line));
            }
            let fields = line.split('\t').collect::<Vec<&str>>();
            if fields.len() != 2 {
                return Err(Error::FieldCount { expected: 2, line });
            }
            let id = dict.id_of(fields[0])?;
            counts[id] = fields[1]
                .parse::<f64>()
                .map_err(|_| Error::InvalidCount(fields[1].to_string()))?;
        }
        debug!("Loaded counts for {} tags", counts.len());

        Ok(counts)
    }

    /// Vector length
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Checks if the vector has zero length
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Read-only view of the underlying values
    pub fn values(&self) -> &[f64] {
        &self.counts
    }

    /// Resets every entry to zero
    pub fn zero(&mut self) {
        for count in &mut self.counts {
            *count = 0.0;
        }
    }

    /// Copies `other` into `self` elementwise
    pub fn assign(&mut self, other: &TagCounts) -> Result<()> {
        if self.len() != other.len() {
            return Err(Error::LengthMismatch(self.len(), other.len()));
        }
        self.counts.copy_from_slice(&other.counts);
        Ok(())
    }

    /// Sum over all entries
    pub fn sum(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Smallest entry
    pub fn min(&self) -> f64 {
        self.counts.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    /// `max_i |a[i] - b[i]|`
    pub fn max_abs_diff(a: &TagCounts, b: &TagCounts) -> Result<f64> {
        if a.len() != b.len() {
            return Err(Error::LengthMismatch(a.len(), b.len()));
        }
        Ok(a.counts
            .iter()
            .zip(&b.counts)
            .map(|(x, y)| (x - y).abs())
            .fold(0.0, f64::max))
    }

    /// Writes one `<tag><TAB><value>` line per tag in id order
    pub fn write_tsv<W: Write>(&self, dict: &TagDict, mut wtr: W) -> Result<()> {
        for id in 0..self.len() {
            writeln!(wtr, "{}\t{}", dict.seq_of(id), self.counts[id])?;
        }
        Ok(())
    }
}

impl Index<usize> for TagCounts {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.counts[i]
    }
}

impl IndexMut<usize> for TagCounts {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.counts[i]
    }
}
