use thiserror::Error;

#[derive(Debug, Error)]
/// Errors of which majority are related to I/O issues or incorrect file format errors
pub enum Error {
    #[error("Could not read input")]
    /// Could not read a line or record from an input stream
    Io(#[from] std::io::Error),
    #[error("Could not open input file")]
    /// Open (possibly compressed) input error
    OpenError(#[from] niffler::Error),
    #[error("Input error. Empty tag list stream?")]
    /// Tag list stream ended before the header line
    EmptyTagList,
    #[error("Expected 2 whitespace separated integers in tag list header but got \"{0}\"")]
    /// Tag list header malformed
    InvalidTagListHeader(String),
    #[error("Expected {expected} tags but read {found}")]
    /// Declared tag count disagrees with the number of tag lines read
    TagCountMismatch {
        /// Count declared in the header
        expected: usize,
        /// Count actually read
        found: usize,
    },
    #[error("Expected {expected} total residues but read {found}")]
    /// Declared residue count disagrees with the residues actually read
    ResidueCountMismatch {
        /// Residue total declared in the header
        expected: usize,
        /// Residue total actually read
        found: usize,
    },
    #[error("Tag list not sorted or not unique. Tag \"{0}\" should come after tag \"{1}\"")]
    /// Adjacent tag list entries out of lexicographic order
    UnsortedTags(String, String),
    #[error("Only A, G, C and T nucleotides are allowed but got {0}")]
    /// Incorect nucleotide supplied
    IncorrectNuc(String),
    #[error("No serial number for tag \"{0}\"")]
    /// Tag sequence absent from the dictionary
    UnknownTag(String),
    #[error("Fields should be separated by exactly one tab character. line:\n{0}")]
    /// Adjacent tab characters found in a tab separated line
    DoubleTab(String),
    #[error("Expected {expected} tab separated fields but got \"{line}\"")]
    /// Wrong number of fields in a tab separated line
    FieldCount {
        /// Number of fields expected
        expected: usize,
        /// The offending line
        line: String,
    },
    #[error("Could not parse \"{0}\" as a count value")]
    /// Count field is not a number
    InvalidCount(String),
    #[error("Expected equal sizes but got {0} and {1}")]
    /// Vector lengths of collaborating components disagree
    LengthMismatch(usize, usize),
    #[error("Not a neighbor probability graph file (bad signature)")]
    /// Graph file does not start with the format signature
    BadGraphSignature,
    #[error("Binary input failed in middle of record")]
    /// Graph file ended inside a row record
    TruncatedGraph,
    #[error("Binary input file error. Could not read first record")]
    /// Graph file holds no rows
    EmptyGraph,
    #[error("Could not parse \"{0}\" as a probability")]
    /// Probability field is not a number
    UnparsableProb(String),
    #[error("Invalid probability value: {0}")]
    /// Neighbor probability outside the accepted range
    InvalidProb(f64),
    #[error("Tag \"{0}\" found in its own neighbor list")]
    /// Self edges are derived, not listed
    SelfNeighbor(String),
    #[error("Expected an odd number of fields in neighbor list line but got {0}")]
    /// Neighbor list lines hold a tag then (neighbor, probability) pairs
    EvenNeighborFields(usize),
    #[error("Observed counts should all be at least 1 but the smallest is {0}")]
    /// Correction assumes every tag was observed at least once
    CountBelowOne(f64),
}
