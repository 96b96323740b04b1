//! Resolved run configuration.
use crate::error::ParserError;
use bitflags::bitflags;
use std::net::IpAddr;
use std::path::PathBuf;

/// Maximum number of peers that can be selected at once.
pub const PEER_SELECTION_MAX: usize = 8;

pub const DEFAULT_BUFFER_SIZE: &str = "16MiB";
pub const DEFAULT_ROUTE_CAPACITY: &str = "1000K";

bitflags! {
    /// Requested outputs.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modes: u32 {
        const SHOW         = 1 << 0;
        const BRIEF        = 1 << 1;
        const COMPAT       = 1 << 2;
        const COUNT        = 1 << 3;
        const PLEN_DIST    = 1 << 4;
        const PEER_TABLE   = 1 << 5;
        const DIFF         = 1 << 6;
        const DIFF_VERBOSE = 1 << 7;
        const DIFF_LOOKUP  = 1 << 8;
        const STAT         = 1 << 9;
        const LOOKUP       = 1 << 10;
        const BENCHMARK    = 1 << 11;
    }
}

impl Modes {
    /// Modes that read path attributes.
    pub const NEEDS_ATTRIBUTES: Modes = Modes::SHOW
        .union(Modes::BRIEF)
        .union(Modes::COMPAT)
        .union(Modes::DIFF)
        .union(Modes::STAT)
        .union(Modes::LOOKUP);

    /// Modes that compare two peers.
    pub const ANY_DIFF: Modes = Modes::DIFF
        .union(Modes::DIFF_VERBOSE)
        .union(Modes::DIFF_LOOKUP);

    /// Modes that print decoded routes as they arrive.
    pub const ROUTE_OUTPUT: Modes = Modes::SHOW.union(Modes::BRIEF).union(Modes::COMPAT);

    /// Modes that keep the per-peer route tables and trees.
    pub const NEEDS_TABLES: Modes = Modes::ANY_DIFF.union(Modes::LOOKUP);
}

/// What to do when a sequence number does not fit the route table.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverflowPolicy {
    /// Report once and store into the last slot.
    #[default]
    Clamp,
    /// Extend the table to hold the sequence number.
    Grow,
}

/// Address family restriction for lookups.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QueryFamily {
    #[default]
    Any,
    Ipv4,
    Ipv6,
}

impl QueryFamily {
    pub fn accepts(&self, addr: &IpAddr) -> bool {
        match self {
            QueryFamily::Any => true,
            QueryFamily::Ipv4 => addr.is_ipv4(),
            QueryFamily::Ipv6 => addr.is_ipv6(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Explicitly selected peer indices, in selection order.
    pub peer_indices: Vec<u16>,
    /// Peers whose AS number is listed here are selected when the peer table is read.
    pub peer_asns: Vec<u32>,
    pub modes: Modes,
    /// Route table slots per selected peer.
    pub route_capacity: usize,
    /// Read buffer size; also the largest record that can be framed.
    pub buffer_size: usize,
    pub overflow_policy: OverflowPolicy,
    pub lookup_addr: Option<IpAddr>,
    pub lookup_file: Option<PathBuf>,
    pub query_family: QueryFamily,
    pub verbose: bool,
    /// Second `-v`: per-key listings and tree dumps.
    pub detail: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            peer_indices: vec![],
            peer_asns: vec![],
            modes: Modes::empty(),
            route_capacity: 1_000_000,
            buffer_size: 16 * 1024 * 1024,
            overflow_policy: OverflowPolicy::default(),
            lookup_addr: None,
            lookup_file: None,
            query_family: QueryFamily::default(),
            verbose: false,
            detail: false,
        }
    }
}

impl Config {
    /// Fill in implied settings and reject impossible combinations.
    ///
    /// No output mode means [Modes::SHOW]. A lookup without any selection
    /// selects peer 0. Diffs need exactly two selected peers, unless the
    /// selection is made by AS number and only known after the peer table.
    pub fn resolve(mut self) -> Result<Self, ParserError> {
        if self.lookup_addr.is_some() || self.lookup_file.is_some() {
            self.modes |= Modes::LOOKUP;
        }
        if self.modes.intersects(Modes::DIFF_VERBOSE | Modes::DIFF_LOOKUP) {
            self.modes |= Modes::DIFF;
        }
        if self.modes.is_empty() {
            self.modes = Modes::SHOW;
        }
        if self.peer_indices.len() + self.peer_asns.len() > PEER_SELECTION_MAX {
            return Err(ParserError::Unsupported(format!(
                "at most {} peers can be selected",
                PEER_SELECTION_MAX
            )));
        }
        if self.modes.contains(Modes::LOOKUP)
            && self.peer_indices.is_empty()
            && self.peer_asns.is_empty()
        {
            self.peer_indices.push(0);
        }
        if self.modes.intersects(Modes::ANY_DIFF)
            && self.peer_asns.is_empty()
            && self.peer_indices.len() != 2
        {
            return Err(ParserError::Unsupported(
                "diff needs exactly two selected peers".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn has_selection(&self) -> bool {
        !self.peer_indices.is_empty() || !self.peer_asns.is_empty()
    }
}

/// Parse a human-readable size.
///
/// Binary suffixes `KiB`, `MiB`, `GiB` and `TiB` multiply by powers of 1024.
/// Single-letter suffixes `k`/`K`, `m`/`M`, `g`/`G`, `T` and `P` multiply by
/// powers of 1000.
pub fn parse_size(input: &str) -> Result<usize, ParserError> {
    let s = input.trim();
    let invalid = || ParserError::InvalidSize(input.to_string());

    let (digits, multiplier): (&str, u64) = if let Some(number) = s.strip_suffix("iB") {
        let mut chars = number.chars();
        let power = match chars.next_back() {
            Some('K') => 1,
            Some('M') => 2,
            Some('G') => 3,
            Some('T') => 4,
            _ => return Err(invalid()),
        };
        (chars.as_str(), 1024u64.pow(power))
    } else {
        let mut chars = s.chars();
        let multiplier = match chars.next_back() {
            Some('k' | 'K') => 1_000,
            Some('m' | 'M') => 1_000_000,
            Some('g' | 'G') => 1_000_000_000,
            Some('T') => 1_000_000_000_000,
            Some('P') => 1_000_000_000_000_000,
            _ => return s.parse::<usize>().map_err(|_| invalid()),
        };
        (chars.as_str(), multiplier)
    };

    let value: u64 = digits.trim().parse().map_err(|_| invalid())?;
    value
        .checked_mul(multiplier)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or_else(invalid)
}
