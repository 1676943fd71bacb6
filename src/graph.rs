use crate::dict::TagDict;
use crate::error::Error;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::{info, warn};
use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};

type Result<T> = std::result::Result<T, Error>;

/// Signature bytes opening every graph file
pub const GRAPH_SIGNATURE: [u8; 16] = *b"tagmendgraph001\n";

/// Header length: the signature plus the declared tag universe size
const HEADER_LEN: u64 = GRAPH_SIGNATURE.len() as u64 + 8;

/// Largest probability a listed neighbor may carry; the leftover mass belongs
/// to the derived self edge
pub const MAX_NEIGHBOR_PROB: f64 = 0.5;

/// A single `(neighbor id, misread probability)` edge
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub struct Neighbor {
    pub id: u32,
    pub prob: f64,
}

/// Neighbors of a single source tag, weighted by misread probability.
/// Probabilities need not sum to 1 across a row; mass lost to sequences
/// outside the tag set stays implicit.
#[derive(Debug, Default)]
pub struct NeighborRow {
    id: u32,
    neighbors: Vec<Neighbor>,
}

impl NeighborRow {
    /// Serial id of the source tag
    pub fn id(&self) -> u32 {
        self.id
    }

    /// The `(neighbor, probability)` pairs of this row
    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Reads the next row record, returning `false` at a clean end of file.
    /// End of file inside a record is an error.
    fn read_from<R: Read>(&mut self, rdr: &mut R) -> Result<bool> {
        let id = match rdr.read_u32::<LittleEndian>() {
            Ok(id) => id,
            Err(e) => {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    return Ok(false);
                }
                return Err(e.into());
            }
        };
        let len = rdr
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::TruncatedGraph)?;

        self.id = id;
        self.neighbors.clear();
        self.neighbors.reserve(len as usize);
        for _ in 0..len {
            let id = rdr
                .read_u32::<LittleEndian>()
                .map_err(|_| Error::TruncatedGraph)?;
            let prob = rdr
                .read_f64::<LittleEndian>()
                .map_err(|_| Error::TruncatedGraph)?;
            self.neighbors.push(Neighbor { id, prob });
        }
        Ok(true)
    }

    fn write_to<W: Write>(&self, wtr: &mut W) -> Result<()> {
        wtr.write_u32::<LittleEndian>(self.id)?;
        wtr.write_u32::<LittleEndian>(self.neighbors.len() as u32)?;
        for neighbor in &self.neighbors {
            wtr.write_u32::<LittleEndian>(neighbor.id)?;
            wtr.write_f64::<LittleEndian>(neighbor.prob)?;
        }
        Ok(())
    }
}

/// Forward-only cursor over an on-disk neighbor probability graph. Only the
/// row at the cursor position is held in memory, so the graph can be
/// arbitrarily large on disk. Callers needing a full pass start from
/// [`rewind`](GraphReader::rewind); there is no random access.
#[derive(Debug)]
pub struct GraphReader<R: Read + Seek> {
    inner: R,
    universe: usize,
    row: NeighborRow,
}

impl<R: Read + Seek> GraphReader<R> {
    /// Checks the signature and reads the declared tag universe size
    pub fn new(mut inner: R) -> Result<Self> {
        inner.seek(SeekFrom::Start(0))?;
        let mut signature = [0; GRAPH_SIGNATURE.len()];
        inner
            .read_exact(&mut signature)
            .map_err(|_| Error::BadGraphSignature)?;
        if signature != GRAPH_SIGNATURE {
            return Err(Error::BadGraphSignature);
        }
        let universe = inner
            .read_u64::<LittleEndian>()
            .map_err(|_| Error::BadGraphSignature)?;

        Ok(Self {
            inner,
            universe: universe as usize,
            row: NeighborRow::default(),
        })
    }

    /// Declared tag universe size, shared with the dictionary and the count
    /// vectors the graph is used against
    pub fn universe(&self) -> usize {
        self.universe
    }

    /// Repositions at the first row and reads it
    pub fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(HEADER_LEN))?;
        if !self.row.read_from(&mut self.inner)? {
            return Err(Error::EmptyGraph);
        }
        Ok(())
    }

    /// Reads the next row, returning `false` at end of file
    pub fn advance(&mut self) -> Result<bool> {
        self.row.read_from(&mut self.inner)
    }

    /// The row at the current cursor position
    pub fn row(&self) -> &NeighborRow {
        &self.row
    }
}

/// Builds a binary graph file from a text neighbor list. Each line holds a tag
/// sequence followed by tab separated `(neighbor sequence, probability)` pairs.
/// Neighbors absent from the dictionary are skipped. A tag may not list
/// itself; when the retained probabilities sum to at most 1 the self edge is
/// appended with the leftover mass. Returns the number of rows written.
pub fn write_graph<R: BufRead, W: Write>(dict: &TagDict, text: R, wtr: &mut W) -> Result<u64> {
    wtr.write_all(&GRAPH_SIGNATURE)?;
    wtr.write_u64::<LittleEndian>(dict.len() as u64)?;

    let mut row = NeighborRow::default();
    let mut rows_written = 0;

    for line in text.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }
        if line.contains("\t\t") {
            return Err(Error::DoubleTab(line));
        }
        let fields = line.split('\t').collect::<Vec<&str>>();
        if fields.len() % 2 == 0 {
            return Err(Error::EvenNeighborFields(fields.len()));
        }

        let tag_seq = fields[0];
        row.id = dict.id_of(tag_seq)? as u32;
        row.neighbors.clear();

        let mut listed_mass = 0.0;
        for pair in fields[1..].chunks(2) {
            let neighbor_seq = pair[0];
            if neighbor_seq == tag_seq {
                return Err(Error::SelfNeighbor(tag_seq.to_string()));
            }
            let prob = pair[1]
                .parse::<f64>()
                .map_err(|_| Error::UnparsableProb(pair[1].to_string()))?;
            if !(0.0..MAX_NEIGHBOR_PROB).contains(&prob) {
                return Err(Error::InvalidProb(prob));
            }
            match dict.lookup(neighbor_seq)? {
                Some(id) => {
                    row.neighbors.push(Neighbor { id: id as u32, prob });
                    listed_mass += prob;
                }
                None => warn!("Skipping neighbor \"{}\" absent from the tag list", neighbor_seq),
            }
        }

        if listed_mass <= 1.0 {
            row.neighbors.push(Neighbor {
                id: row.id,
                prob: 1.0 - listed_mass,
            });
        }

        row.write_to(wtr)?;
        rows_written += 1;
    }
    info!("Wrote {} neighbor rows", rows_written);

    Ok(rows_written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dict() -> TagDict {
        TagDict::from_reader(Cursor::new(b"3 6\nAA\nAC\nGT\n" as &[u8])).unwrap()
    }

    fn graph_bytes(text: &str) -> Vec<u8> {
        let mut bytes = Vec::new();
        write_graph(&dict(), Cursor::new(text.as_bytes()), &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn write_then_scan() {
        let bytes = graph_bytes("AA\tAC\t0.1\nAC\nGT\n");
        let mut graph = GraphReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(graph.universe(), 3);

        graph.rewind().unwrap();
        assert_eq!(graph.row().id(), 0);
        assert_eq!(
            graph.row().neighbors(),
            &[
                Neighbor { id: 1, prob: 0.1 },
                Neighbor { id: 0, prob: 0.9 }
            ]
        );

        assert!(graph.advance().unwrap());
        assert_eq!(graph.row().id(), 1);
        assert_eq!(graph.row().neighbors(), &[Neighbor { id: 1, prob: 1.0 }]);

        assert!(graph.advance().unwrap());
        assert_eq!(graph.row().id(), 2);
        assert!(!graph.advance().unwrap());
    }

    #[test]
    fn rewind_restarts_the_scan() {
        let bytes = graph_bytes("AA\nAC\nGT\n");
        let mut graph = GraphReader::new(Cursor::new(bytes)).unwrap();
        graph.rewind().unwrap();
        while graph.advance().unwrap() {}
        graph.rewind().unwrap();
        assert_eq!(graph.row().id(), 0);
    }

    #[test]
    fn unknown_neighbors_are_skipped() {
        // TT is not in the dictionary; its mass stays implicit
        let bytes = graph_bytes("AA\tTT\t0.2\tAC\t0.1\n");
        let mut graph = GraphReader::new(Cursor::new(bytes)).unwrap();
        graph.rewind().unwrap();
        assert_eq!(
            graph.row().neighbors(),
            &[
                Neighbor { id: 1, prob: 0.1 },
                Neighbor { id: 0, prob: 0.9 }
            ]
        );
    }

    #[test]
    fn bad_signature_is_an_error() {
        let bytes = b"notagraphfile---\x00\x00\x00\x00\x00\x00\x00\x00".to_vec();
        assert!(matches!(
            GraphReader::new(Cursor::new(bytes)),
            Err(Error::BadGraphSignature)
        ));
    }

    #[test]
    fn truncated_record_is_an_error() {
        let mut bytes = graph_bytes("AA\tAC\t0.1\n");
        bytes.truncate(bytes.len() - 4);
        let mut graph = GraphReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(graph.rewind(), Err(Error::TruncatedGraph)));
    }

    #[test]
    fn empty_graph_cannot_rewind() {
        let bytes = graph_bytes("");
        let mut graph = GraphReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(graph.rewind(), Err(Error::EmptyGraph)));
    }

    #[test]
    fn writer_rejects_self_neighbors() {
        let mut out = Vec::new();
        let result = write_graph(&dict(), Cursor::new(b"AA\tAA\t0.1\n" as &[u8]), &mut out);
        assert!(matches!(result, Err(Error::SelfNeighbor(_))));
    }

    #[test]
    fn writer_rejects_out_of_range_probabilities() {
        let mut out = Vec::new();
        let result = write_graph(&dict(), Cursor::new(b"AA\tAC\t0.6\n" as &[u8]), &mut out);
        assert!(matches!(result, Err(Error::InvalidProb(_))));
    }

    #[test]
    fn writer_rejects_even_field_counts() {
        let mut out = Vec::new();
        let result = write_graph(&dict(), Cursor::new(b"AA\tAC\n" as &[u8]), &mut out);
        assert!(matches!(result, Err(Error::EvenNeighborFields(2))));
    }
}
