use log::LevelFilter;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "tagmend",
    about = "Corrects observed sequence tag counts for misread error using a neighbor probability graph"
)]
pub(crate) struct TagMend {
    #[structopt(
        short = "v",
        long = "verbose",
        parse(from_occurrences),
        global = true,
        help = "Determines verbosity of the processing, can be specified multiple times"
    )]
    pub verbosity: u8,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, StructOpt)]
pub(crate) enum Command {
    /// Estimates the true tag counts behind a set of observed counts
    Correct {
        #[structopt(
            help = "Tag list; a header line holding tag and residue totals then one tag per line",
            parse(from_os_str)
        )]
        tags: PathBuf,
        #[structopt(help = "Binary neighbor probability graph", parse(from_os_str))]
        graph: PathBuf,
        #[structopt(
            help = "Observed counts; one tab separated (tag, count) pair per line",
            parse(from_os_str)
        )]
        counts: PathBuf,
        #[structopt(
            short = "r",
            long = "rounds-to-wait",
            default_value = "10",
            help = "Number of iterations to wait for improvement before terminating"
        )]
        rounds_to_wait: usize,
    },
    /// Prints the mean and standard deviation of the counts the error model
    /// would produce if the supplied counts were the true counts
    Expect {
        #[structopt(
            help = "Tag list; a header line holding tag and residue totals then one tag per line",
            parse(from_os_str)
        )]
        tags: PathBuf,
        #[structopt(help = "Binary neighbor probability graph", parse(from_os_str))]
        graph: PathBuf,
        #[structopt(
            help = "True counts; one tab separated (tag, count) pair per line",
            parse(from_os_str)
        )]
        counts: PathBuf,
    },
    /// Builds the binary neighbor probability graph from a text neighbor list
    BuildGraph {
        #[structopt(
            help = "Tag list; a header line holding tag and residue totals then one tag per line",
            parse(from_os_str)
        )]
        tags: PathBuf,
        #[structopt(
            help = "Text neighbor list; a tag then tab separated (neighbor, probability) pairs per line",
            parse(from_os_str)
        )]
        neighbors: PathBuf,
        #[structopt(help = "Output path for the binary graph", parse(from_os_str))]
        output: PathBuf,
    },
    /// Renders a binary neighbor probability graph back to text
    DumpGraph {
        #[structopt(
            help = "Tag list; a header line holding tag and residue totals then one tag per line",
            parse(from_os_str)
        )]
        tags: PathBuf,
        #[structopt(help = "Binary neighbor probability graph", parse(from_os_str))]
        graph: PathBuf,
    },
}

impl TagMend {
    /// Sets the logging level based on the occurences of `-v`
    pub(crate) fn set_logging(&self) {
        let level = match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        env_logger::Builder::new().filter_level(level).init();
    }
}
