//! Longest-prefix lookups against the first selected peer's trees.
use crate::config::{Config, Modes};
use crate::formats::{format_benchmark, format_lookup_result, format_tree_entry};
use crate::io::open_input;
use crate::rib::PeerRib;
use crate::ParserError;
use log::{debug, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Instant;

/// Parse newline-delimited addresses.
///
/// Blank lines and lines starting with `#` are ignored. Lines that are not
/// an address are logged and skipped.
pub fn parse_targets<R: BufRead>(reader: R) -> Result<Vec<IpAddr>, ParserError> {
    let mut targets = vec![];
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match IpAddr::from_str(line) {
            Ok(addr) => targets.push(addr),
            Err(_) => warn!(
                "{}",
                ParserError::InvalidAddress(format!("line {}: {}", lineno + 1, line))
            ),
        }
    }
    Ok(targets)
}

/// Read lookup targets from a (possibly compressed) file.
pub fn load_lookup_file(path: &str) -> Result<Vec<IpAddr>, ParserError> {
    parse_targets(BufReader::new(open_input(path)?))
}

/// Every lookup target of `config`, filtered by its query family.
pub fn lookup_targets(config: &Config) -> Result<Vec<IpAddr>, ParserError> {
    let mut targets: Vec<IpAddr> = config.lookup_addr.into_iter().collect();
    if let Some(path) = &config.lookup_file {
        targets.extend(load_lookup_file(&path.to_string_lossy())?);
    }
    targets.retain(|addr| {
        let accepted = config.query_family.accepts(addr);
        if !accepted {
            debug!("skip lookup of {}: address family filtered", addr);
        }
        accepted
    });
    Ok(targets)
}

/// Run the configured lookups against the first peer of `selection`.
///
/// In benchmark mode only the timing line is printed. With `verbose` the
/// queried trees are listed after the results.
pub fn run_lookups<W: Write + ?Sized>(
    config: &Config,
    selection: &[PeerRib],
    out: &mut W,
) -> Result<(), ParserError> {
    let Some(rib) = selection.first() else {
        warn!("lookup requested without a selected peer");
        return Ok(());
    };
    let targets = lookup_targets(config)?;

    if config.modes.contains(Modes::BENCHMARK) {
        let start = Instant::now();
        let found = targets
            .iter()
            .filter(|addr| rib.lookup_addr(addr).is_some())
            .count();
        let elapsed = start.elapsed();
        debug!("{} of {} lookups matched", found, targets.len());
        writeln!(out, "{}", format_benchmark(targets.len(), elapsed))?;
    } else {
        for addr in &targets {
            writeln!(out, "{}", format_lookup_result(addr, rib.lookup_addr(addr)))?;
        }
    }

    if config.verbose {
        for ipv4 in [true, false] {
            if !targets.iter().any(|addr| addr.is_ipv4() == ipv4) {
                continue;
            }
            for route in rib.tree_routes(ipv4) {
                writeln!(out, "{}", format_tree_entry(route))?;
            }
            writeln!(out, "number of routes: {}", rib.tree(ipv4).len())?;
        }
    }
    Ok(())
}
