use std::io::{BufWriter, ErrorKind, Write};
use std::net::IpAddr;
use std::path::PathBuf;

use bgpkit_ribdump::config::*;
use bgpkit_ribdump::io::{open_input, process_input};
use bgpkit_ribdump::parser::MrtFramer;
use bgpkit_ribdump::rib::RibProcessor;
use bgpkit_ribdump::ParserError;
use clap::{ArgAction, Parser};
use log::{error, info};

/// ribdump reads MRT TABLE_DUMP_V2 RIB files and prints, counts, compares or
/// queries the routes of selected peers.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Opts {
    /// MRT files to read, raw, gzip or bzip2 compressed.
    #[clap(name = "FILE", required = true)]
    files: Vec<PathBuf>,

    /// More output: -v lists trees and logs at info level, -vv adds per-key statistics.
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log at debug level.
    #[clap(short, long)]
    debug: bool,

    /// Print routes in the pipe-delimited bgpdump -m format.
    #[clap(short = 'm', long)]
    compat_mode: bool,

    /// Print routes as prefix and next hop only.
    #[clap(short, long)]
    brief: bool,

    /// Print the peer index table only.
    #[clap(short = 'P', long)]
    peer_table: bool,

    /// Select a peer by index. Repeatable.
    #[clap(short, long)]
    peer: Vec<u16>,

    /// Select every peer with this AS number. Repeatable.
    #[clap(short, long)]
    autnum: Vec<u32>,

    /// Compare the routes of two selected peers.
    #[clap(short = 'u', long)]
    diff: bool,

    /// Compare two peers and print both sides of every sequence number.
    #[clap(short = 'U', long)]
    diff_verbose: bool,

    /// Compare two peers, telling aggregated differences apart through lookups.
    #[clap(short = 'r', long)]
    diff_table: bool,

    /// Print route counts per peer for every file.
    #[clap(short, long)]
    count: bool,

    /// Print route counts per prefix length for every file.
    #[clap(short = 'C', long)]
    plen_dist: bool,

    /// Print per-peer statistics.
    #[clap(short = 'k', long)]
    peer_stat: bool,

    /// Read buffer size, also the largest record accepted (e.g. 16MiB).
    #[clap(short = 'N', long, value_parser = parse_size, default_value = DEFAULT_BUFFER_SIZE)]
    bufsiz: usize,

    /// Route table size per selected peer (e.g. 1000K).
    #[clap(short = 'M', long, value_parser = parse_size, default_value = DEFAULT_ROUTE_CAPACITY)]
    nroutes: usize,

    /// Grow route tables past --nroutes instead of clamping.
    #[clap(long)]
    grow_tables: bool,

    /// Time the lookups instead of printing their results.
    #[clap(short = 'g', long)]
    benchmark: bool,

    /// Look up an address in the first selected peer's table.
    #[clap(short, long)]
    lookup: Option<IpAddr>,

    /// Look up every address listed in a file, one per line.
    #[clap(short = 'L', long)]
    lookup_file: Option<PathBuf>,

    /// Look up IPv4 addresses only.
    #[clap(short = '4', long)]
    ipv4: bool,

    /// Look up IPv6 addresses only.
    #[clap(short = '6', long)]
    ipv6: bool,
}

impl Opts {
    fn to_config(&self) -> Result<Config, ParserError> {
        let mut modes = Modes::empty();
        for (set, mode) in [
            (self.compat_mode, Modes::COMPAT),
            (self.brief, Modes::BRIEF),
            (self.peer_table, Modes::PEER_TABLE),
            (self.diff, Modes::DIFF),
            (self.diff_verbose, Modes::DIFF_VERBOSE),
            (self.diff_table, Modes::DIFF_LOOKUP),
            (self.count, Modes::COUNT),
            (self.plen_dist, Modes::PLEN_DIST),
            (self.peer_stat, Modes::STAT),
            (self.benchmark, Modes::BENCHMARK),
        ] {
            if set {
                modes |= mode;
            }
        }

        let query_family = match (self.ipv4, self.ipv6) {
            (true, true) => {
                return Err(ParserError::Unsupported(
                    "--ipv4 and --ipv6 cannot be used together".to_string(),
                ))
            }
            (true, false) => QueryFamily::Ipv4,
            (false, true) => QueryFamily::Ipv6,
            (false, false) => QueryFamily::Any,
        };

        Config {
            peer_indices: self.peer.clone(),
            peer_asns: self.autnum.clone(),
            modes,
            route_capacity: self.nroutes,
            buffer_size: self.bufsiz,
            overflow_policy: match self.grow_tables {
                true => OverflowPolicy::Grow,
                false => OverflowPolicy::Clamp,
            },
            lookup_addr: self.lookup,
            lookup_file: self.lookup_file.clone(),
            query_family,
            verbose: self.verbose > 0,
            detail: self.verbose > 1,
        }
        .resolve()
    }
}

/// Report a fatal error and exit. A closed output pipe exits quietly.
fn fail(err: ParserError) -> ! {
    match &err {
        ParserError::IoError(e) if e.kind() == ErrorKind::BrokenPipe => {}
        _ => eprintln!("{}", err),
    }
    std::process::exit(1);
}

fn main() {
    let opts: Opts = Opts::parse();

    let level = match (opts.debug, opts.verbose) {
        (true, _) => "debug",
        (false, 0) => "warn",
        (false, _) => "info",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match opts.to_config() {
        Ok(c) => c,
        Err(e) => fail(e),
    };

    let mut framer = MrtFramer::with_capacity(config.buffer_size);
    let stdout = std::io::stdout();
    let mut processor = RibProcessor::new(config, BufWriter::new(stdout.lock()));

    for path in &opts.files {
        let path = path.to_string_lossy();
        let mut reader = match open_input(&path) {
            Ok(reader) => reader,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };
        match process_input(&mut reader, &mut framer, &mut processor) {
            Ok(outcome) => info!(
                "{}: {} records, {} skipped, {} failed",
                path, outcome.handled, outcome.skipped, outcome.failed
            ),
            Err(ParserError::IoError(e)) if e.kind() == ErrorKind::BrokenPipe => {
                fail(ParserError::IoError(e))
            }
            Err(e) => error!("{}: {}", path, e),
        }
        if let Err(e) = processor.finish_file() {
            fail(e);
        }
    }

    if let Err(e) = processor.finish() {
        fail(e);
    }
    if let Err(e) = processor.into_inner().flush() {
        fail(e.into());
    }
}
