//! Reachability delta between the route tables of two selected peers.
//!
//! Slots are compared by sequence number. Plain mode only reports which side
//! holds a route. Lookup mode consults the other side's tree and tells
//! routes still covered by an aggregate apart from routes that vanished.
use crate::formats::{format_diff_line, format_full};
use crate::models::DiffFlag;
use crate::rib::PeerRib;
use ipnet::IpNet;
use std::io::{self, Write};

#[derive(Debug, Default, Clone, Copy)]
pub struct RouteDiffEngine {
    /// Reclassify differences through longest-prefix lookups.
    pub lookup: bool,
    /// Print both sides of every compared slot.
    pub verbose: bool,
}

impl RouteDiffEngine {
    pub fn new(lookup: bool, verbose: bool) -> Self {
        RouteDiffEngine { lookup, verbose }
    }

    /// Compare the slot `seq` of `left` and `right`.
    ///
    /// Every classification is written back into the stored route, printed
    /// to `out` and returned.
    pub fn compare<W: Write + ?Sized>(
        &self,
        seq: u32,
        left: &mut PeerRib,
        right: &mut PeerRib,
        out: &mut W,
    ) -> io::Result<Vec<(DiffFlag, IpNet)>> {
        let left_prefix = left.route_at(seq).map(|r| r.prefix);
        let right_prefix = right.route_at(seq).map(|r| r.prefix);

        if self.verbose && (left_prefix.is_some() || right_prefix.is_some()) {
            writeln!(out, "seq: {}", seq)?;
            if let Some(route) = left.route_at(seq) {
                writeln!(out, "{{{}", format_full(route))?;
            }
            if let Some(route) = right.route_at(seq) {
                writeln!(out, "}}{}", format_full(route))?;
            }
        }

        let mut found = vec![];
        match (left_prefix, right_prefix) {
            (Some(prefix), None) => {
                let flag = match self.lookup {
                    false => DiffFlag::Removed,
                    true => match right.covering_flag(&prefix, prefix.prefix_len()) {
                        Some(Some(DiffFlag::GenuinelyAdded)) => DiffFlag::AggregatedRemoval,
                        Some(_) => DiffFlag::Removed,
                        None => DiffFlag::GenuinelyRemoved,
                    },
                };
                found.push((flag, prefix));
                emit(left, seq, flag, out)?;
            }
            (None, Some(prefix)) => {
                let flag = match self.lookup {
                    false => DiffFlag::Added,
                    true => match left.covering_flag(&prefix, prefix.prefix_len()) {
                        Some(Some(DiffFlag::GenuinelyRemoved)) => DiffFlag::AggregatedAddition,
                        Some(_) => DiffFlag::Added,
                        None => DiffFlag::GenuinelyAdded,
                    },
                };
                found.push((flag, prefix));
                emit(right, seq, flag, out)?;
            }
            (Some(lp), Some(rp)) if self.lookup && lp.prefix_len() > 0 => {
                // one bit shorter aggregate on the other side
                if right.covering_flag(&lp, lp.prefix_len() - 1)
                    == Some(Some(DiffFlag::GenuinelyAdded))
                {
                    found.push((DiffFlag::AggregatedRemoval, lp));
                    emit(left, seq, DiffFlag::AggregatedRemoval, out)?;
                }
                if rp.prefix_len() > 0
                    && left.covering_flag(&rp, rp.prefix_len() - 1)
                        == Some(Some(DiffFlag::GenuinelyRemoved))
                {
                    found.push((DiffFlag::AggregatedAddition, rp));
                    emit(right, seq, DiffFlag::AggregatedAddition, out)?;
                }
            }
            _ => {}
        }
        Ok(found)
    }
}

fn emit<W: Write + ?Sized>(
    rib: &mut PeerRib,
    seq: u32,
    flag: DiffFlag,
    out: &mut W,
) -> io::Result<()> {
    if let Some(route) = rib.route_at_mut(seq) {
        route.diff_flag = Some(flag);
        writeln!(out, "{}", format_diff_line(flag, route))?;
    }
    Ok(())
}
