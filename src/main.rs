#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! CLI for correction of observed sequence tag counts for misread error.
mod cli;

use log::info;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use structopt::StructOpt;
use tagmend::corrector::Corrector;
use tagmend::counts::TagCounts;
use tagmend::dict::TagDict;
use tagmend::error::Error;
use tagmend::expectation::ExpectationComputer;
use tagmend::graph::{write_graph, GraphReader};

type Result<T> = std::result::Result<T, Error>;

fn main() -> Result<()> {
    let opt = cli::TagMend::from_args();
    opt.set_logging();

    match opt.cmd {
        cli::Command::Correct {
            tags,
            graph,
            counts,
            rounds_to_wait,
        } => correct(&tags, &graph, &counts, rounds_to_wait),
        cli::Command::Expect {
            tags,
            graph,
            counts,
        } => expect(&tags, &graph, &counts),
        cli::Command::BuildGraph {
            tags,
            neighbors,
            output,
        } => build_graph(&tags, &neighbors, &output),
        cli::Command::DumpGraph { tags, graph } => dump_graph(&tags, &graph),
    }
}

/// Opens a text input, transparently decompressing gzip
fn open_text(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let (rdr, _) = niffler::from_path(path)?;
    Ok(BufReader::new(rdr))
}

fn correct(tags: &Path, graph_path: &Path, counts: &Path, rounds_to_wait: usize) -> Result<()> {
    let dict = TagDict::from_reader(open_text(tags)?)?;
    let mut graph = GraphReader::new(BufReader::new(File::open(graph_path)?))?;
    let observed = TagCounts::from_reader(&dict, open_text(counts)?)?;

    // the correction update is only meaningful when every tag was seen
    let smallest = observed.min();
    if smallest < 1.0 {
        return Err(Error::CountBelowOne(smallest));
    }

    let mut computer = ExpectationComputer::new(&mut graph);
    let mut corrector = Corrector::new(&mut computer, &observed, rounds_to_wait)?;
    corrector.infer()?;
    info!(
        "Best estimate found at iteration {} out of {} run",
        corrector.best_iteration(),
        corrector.iterations()
    );

    let stdout = io::stdout();
    corrector
        .best_counts()
        .write_tsv(&dict, BufWriter::new(stdout.lock()))?;

    Ok(())
}

fn expect(tags: &Path, graph_path: &Path, counts: &Path) -> Result<()> {
    let dict = TagDict::from_reader(open_text(tags)?)?;
    let mut graph = GraphReader::new(BufReader::new(File::open(graph_path)?))?;
    let true_counts = TagCounts::from_reader(&dict, open_text(counts)?)?;

    let mut computer = ExpectationComputer::new(&mut graph);
    let mut expected = TagCounts::zeros(true_counts.len());
    let mut variances = TagCounts::zeros(true_counts.len());
    computer.mean_counts(&true_counts, &mut expected)?;
    computer.variance_counts(&true_counts, &mut variances)?;
    info!(
        "Sum of supplied counts: {}, sum of expected counts: {}",
        true_counts.sum(),
        expected.sum()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for id in 0..dict.len() {
        writeln!(
            out,
            "{}\t{}\t{}",
            dict.seq_of(id),
            expected[id],
            variances[id].sqrt()
        )?;
    }

    Ok(())
}

fn build_graph(tags: &Path, neighbors: &Path, output: &Path) -> Result<()> {
    let dict = TagDict::from_reader(open_text(tags)?)?;
    let mut out = BufWriter::new(File::create(output)?);
    let rows = write_graph(&dict, open_text(neighbors)?, &mut out)?;
    out.flush()?;
    info!("Wrote {} neighbor rows to {}", rows, output.display());

    Ok(())
}

fn dump_graph(tags: &Path, graph_path: &Path) -> Result<()> {
    let dict = TagDict::from_reader(open_text(tags)?)?;
    let mut graph = GraphReader::new(BufReader::new(File::open(graph_path)?))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    graph.rewind()?;
    loop {
        let row = graph.row();
        write!(out, "{}", dict.seq_of(row.id() as usize))?;
        for neighbor in row.neighbors() {
            write!(
                out,
                "\t{}\t{}",
                dict.seq_of(neighbor.id as usize),
                neighbor.prob
            )?;
        }
        writeln!(out)?;
        if !graph.advance()? {
            break;
        }
    }

    Ok(())
}
