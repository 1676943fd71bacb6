use crate::error::Error;
use log::debug;
use std::cmp::Ordering;
use std::io::BufRead;

type Result<T> = std::result::Result<T, Error>;

/// Bytes needed to store `len` residues at 2 bits per residue
fn bytes_needed(len: usize) -> usize {
    (len + 3) / 4
}

/// 2-bit index of a nucleotide. `A < C < G < T` so packed byte runs compare
/// in the same order as the sequences they encode.
fn residue_index(nuc: u8) -> Result<u8> {
    match nuc {
        b'A' | b'a' => Ok(0),
        b'C' | b'c' => Ok(1),
        b'G' | b'g' => Ok(2),
        b'T' | b't' => Ok(3),
        _ => Err(Error::IncorrectNuc((nuc as char).to_string())),
    }
}

fn encode(seq: &str) -> Result<Vec<u8>> {
    seq.bytes().map(residue_index).collect()
}

/// Packs residue indices 4 per byte, first residue in the most significant bits
fn pack(indices: &[u8]) -> Vec<u8> {
    let mut packed = vec![0u8; bytes_needed(indices.len())];
    for (i, &idx) in indices.iter().enumerate() {
        packed[i / 4] |= idx << (6 - 2 * (i % 4));
    }
    packed
}

fn unpack(packed: &[u8], len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (packed[i / 4] >> (6 - 2 * (i % 4))) & 3)
        .collect()
}

/// Compares two packed runs up to the shorter length, shorter sorts first on a tie.
/// Padding bits are zero, the same as an `A` run, so a padded final byte can
/// compare equal to a genuine extension but never greater.
fn packed_less(seq1: &[u8], len1: usize, seq2: &[u8], len2: usize) -> bool {
    let min_bytes = bytes_needed(len1.min(len2));
    match seq1[..min_bytes].cmp(&seq2[..min_bytes]) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => len1 < len2,
    }
}

/// Immutable sorted dictionary mapping between serial tag ids and tag sequences.
/// Ids are assigned by the sort order of the packed sequences, so loading the
/// same tag list always yields the same numbering.
///
/// Sequences are bit packed into one contiguous buffer. Segments are sized by
/// residue count rather than packed byte count, so the offset difference
/// doubles as the sequence length; the packed run occupies the leading bytes
/// of each segment.
#[derive(Debug)]
pub struct TagDict {
    mem: Vec<u8>,
    /// `len() + 1` entries, entry `i` is the segment start of sequence `i`
    offsets: Vec<usize>,
}

impl TagDict {
    /// Reads a tag list: a header line holding the tag count and total residue
    /// count, then one tag sequence per line, presorted with no duplicates.
    /// Both header counts are checked against what was actually read and the
    /// sort order is verified once after loading.
    pub fn from_reader<R: BufRead>(rdr: R) -> Result<Self> {
        let mut lines = rdr.lines();

        let header = lines.next().ok_or(Error::EmptyTagList)??;
        let fields = header.split_whitespace().collect::<Vec<&str>>();
        if fields.len() != 2 {
            return Err(Error::InvalidTagListHeader(header));
        }
        let declared_tags = fields[0]
            .parse::<usize>()
            .map_err(|_| Error::InvalidTagListHeader(header.clone()))?;
        let declared_residues = fields[1]
            .parse::<usize>()
            .map_err(|_| Error::InvalidTagListHeader(header.clone()))?;

        let mut mem = Vec::with_capacity(declared_residues);
        let mut offsets = Vec::with_capacity(declared_tags + 1);
        offsets.push(0);

        let mut tag_count = 0;
        for line in lines {
            let indices = encode(&line?)?;
            let packed = pack(&indices);

            let segment_start = mem.len();
            mem.resize(segment_start + indices.len(), 0);
            mem[segment_start..segment_start + packed.len()].copy_from_slice(&packed);
            offsets.push(mem.len());
            tag_count += 1;
        }

        if tag_count != declared_tags {
            return Err(Error::TagCountMismatch {
                expected: declared_tags,
                found: tag_count,
            });
        }
        if mem.len() != declared_residues {
            return Err(Error::ResidueCountMismatch {
                expected: declared_residues,
                found: mem.len(),
            });
        }

        let dict = Self { mem, offsets };
        dict.check_sorted()?;
        debug!(
            "Loaded tag dictionary with {} tags over {} residues",
            dict.len(),
            dict.total_residues()
        );
        Ok(dict)
    }

    /// Number of tags
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Checks if the dictionary holds no tags
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total residue count over all tags
    pub fn total_residues(&self) -> usize {
        self.mem.len()
    }

    /// Length in residues of tag `id`
    pub fn seq_len(&self, id: usize) -> usize {
        self.offsets[id + 1] - self.offsets[id]
    }

    fn packed_bytes(&self, id: usize) -> &[u8] {
        let start = self.offsets[id];
        &self.mem[start..start + bytes_needed(self.seq_len(id))]
    }

    /// Returns the serial id of `seq`, or `None` when the tag is absent.
    /// Errors only on characters outside the nucleotide alphabet.
    pub fn lookup(&self, seq: &str) -> Result<Option<usize>> {
        let indices = encode(seq)?;
        let packed = pack(&indices);
        let idx = self.lower_bound(&packed, indices.len());
        let found = idx < self.len()
            && self.seq_len(idx) == indices.len()
            && self.packed_bytes(idx) == packed.as_slice();
        Ok(if found { Some(idx) } else { None })
    }

    /// As [`lookup`](TagDict::lookup) but an absent tag is an error. Used where
    /// membership is already guaranteed by the input file's own validation.
    pub fn id_of(&self, seq: &str) -> Result<usize> {
        self.lookup(seq)?
            .ok_or_else(|| Error::UnknownTag(seq.to_string()))
    }

    /// Unpacks and decodes tag `id` back to its character representation
    pub fn seq_of(&self, id: usize) -> String {
        unpack(self.packed_bytes(id), self.seq_len(id))
            .into_iter()
            .map(|idx| crate::NUCLEOTIDES[idx as usize] as char)
            .collect()
    }

    /// Index of the smallest tag not lexically less than the query,
    /// or `len()` when the query is greater than every tag
    fn lower_bound(&self, packed: &[u8], len: usize) -> usize {
        let mut lower = 0;
        let mut upper = self.len();
        while lower < upper {
            let mid = lower + (upper - lower) / 2;
            if packed_less(self.packed_bytes(mid), self.seq_len(mid), packed, len) {
                lower = mid + 1;
            } else {
                upper = mid;
            }
        }
        upper
    }

    fn check_sorted(&self) -> Result<()> {
        for i in 1..self.len() {
            let in_order = packed_less(
                self.packed_bytes(i - 1),
                self.seq_len(i - 1),
                self.packed_bytes(i),
                self.seq_len(i),
            );
            if !in_order {
                return Err(Error::UnsortedTags(self.seq_of(i - 1), self.seq_of(i)));
            }
        }
        Ok(())
    }
}
