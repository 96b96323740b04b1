/*!
rib module holds the processing context of a dump run.

[RibProcessor] receives framed TABLE_DUMP_V2 records, keeps the peer
registry and the selected peers' route tables, prints per-route output and
feeds the diff engine and the statistics.
*/
mod route_table;

pub use route_table::{PeerRib, RouteTable};

use crate::config::{Config, Modes, PEER_SELECTION_MAX};
use crate::diff::RouteDiffEngine;
use crate::formats::*;
use crate::models::*;
use crate::parser::{
    apply_attributes, parse_table_dump_v2_message, MessageHandler, RibAfiEntries,
    TableDumpV2Message,
};
use crate::peerstat::PeerStatAggregator;
use crate::query::run_lookups;
use crate::ParserError;
use bytes::Bytes;
use chrono::DateTime;
use log::{info, warn};
use std::io::Write;

/// Processing context of one run, shared by every input file.
pub struct RibProcessor<W: Write> {
    config: Config,
    out: W,
    peer_table: PeerIndexTable,
    /// Route counters of every peer index seen, reset after each file.
    counters: Vec<RouteCounters>,
    selection: Vec<PeerRib>,
    stats: PeerStatAggregator,
    diff: RouteDiffEngine,
    timestamp: u32,
    peer_changes: Vec<PeerChange>,
}

impl<W: Write> RibProcessor<W> {
    pub fn new(config: Config, out: W) -> Self {
        let diff = RouteDiffEngine::new(
            config.modes.contains(Modes::DIFF_LOOKUP),
            config.modes.contains(Modes::DIFF_VERBOSE),
        );
        let mut processor = RibProcessor {
            config,
            out,
            peer_table: PeerIndexTable::default(),
            counters: vec![],
            selection: vec![],
            stats: PeerStatAggregator::new(),
            diff,
            timestamp: 0,
            peer_changes: vec![],
        };
        for index in processor.config.peer_indices.clone() {
            processor.select(index);
        }
        processor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn peer_table(&self) -> &PeerIndexTable {
        &self.peer_table
    }

    /// Selected peers in selection order.
    pub fn selection(&self) -> &[PeerRib] {
        &self.selection
    }

    pub fn stats(&self) -> &PeerStatAggregator {
        &self.stats
    }

    pub fn counters(&self) -> &[RouteCounters] {
        &self.counters
    }

    /// Peers whose identity changed between two peer index tables.
    pub fn peer_changes(&self) -> &[PeerChange] {
        &self.peer_changes
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Add `peer_index` to the selection. Returns false when the selection
    /// is already full; selecting a peer twice is a no-op.
    pub fn select(&mut self, peer_index: u16) -> bool {
        if self.position(peer_index).is_some() {
            return true;
        }
        if self.selection.len() >= PEER_SELECTION_MAX {
            warn!(
                "peer selection full: cannot select peer {} (max {})",
                peer_index, PEER_SELECTION_MAX
            );
            return false;
        }
        self.selection.push(PeerRib::new(
            peer_index,
            self.config.route_capacity,
            self.config.overflow_policy,
        ));
        true
    }

    fn position(&self, peer_index: u16) -> Option<usize> {
        self.selection
            .iter()
            .position(|rib| rib.peer_index == peer_index)
    }

    fn is_counted(&self, peer_index: u16) -> bool {
        !self.config.has_selection() || self.position(peer_index).is_some()
    }

    fn handle_peer_table(&mut self, table: PeerIndexTable) -> Result<(), ParserError> {
        info!(
            "peer index table at {}: collector {} view '{}' with {} peers",
            DateTime::from_timestamp(self.timestamp as i64, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| self.timestamp.to_string()),
            table.collector_bgp_id,
            table.view_name,
            table.peers.len()
        );

        for (index, new) in table.peers.iter().enumerate() {
            if let Some(old) = self.peer_table.peers.get(index) {
                if old != new {
                    info!(
                        "peer[{}] changed: {} -> {}",
                        index,
                        format_peer(old),
                        format_peer(new)
                    );
                    self.peer_changes.push(PeerChange {
                        index: index as u16,
                        old: *old,
                        new: *new,
                    });
                }
            }
        }

        if !self.config.peer_asns.is_empty() {
            for (index, peer) in table.peers.iter().enumerate() {
                if self.config.peer_asns.contains(&peer.peer_asn)
                    && self.position(index as u16).is_none()
                    && self.select(index as u16)
                {
                    info!("peer[{}] selected by asn {}", index, peer.peer_asn);
                }
            }
        }

        if self.counters.len() < table.peers.len() {
            self.counters
                .resize_with(table.peers.len(), RouteCounters::default);
        }

        if self.config.modes.contains(Modes::PEER_TABLE) {
            for line in format_peer_table(&table) {
                writeln!(self.out, "{}", line)?;
            }
        }

        self.peer_table = table;
        Ok(())
    }

    fn handle_rib(&mut self, rib: RibAfiEntries) -> Result<(), ParserError> {
        let modes = self.config.modes;
        if modes == Modes::PEER_TABLE {
            return Ok(());
        }

        // decode every entry before anything is applied
        let mut routes = Vec::with_capacity(rib.rib_entries.len());
        for entry in rib.rib_entries {
            if !self.is_counted(entry.peer_index) {
                continue;
            }
            let mut route = Route::new(rib.prefix);
            if modes.intersects(Modes::NEEDS_ATTRIBUTES) {
                apply_attributes(&mut route, entry.attributes)?;
            }
            routes.push((entry.peer_index, route));
        }

        for (peer_index, route) in routes {
            let index = peer_index as usize;
            match self.counters.get_mut(index) {
                Some(counters) if index < self.peer_table.peers.len() => {
                    counters.record(route.prefix_len())
                }
                _ => warn!(
                    "peer index {} beyond peer table of {} peers, entry not counted",
                    peer_index,
                    self.peer_table.peers.len()
                ),
            }

            let line = if modes.contains(Modes::BRIEF) {
                Some(format_brief(&route))
            } else if modes.contains(Modes::SHOW) {
                Some(format_full(&route))
            } else if modes.contains(Modes::COMPAT) {
                let peer = self.peer_table.get_peer_by_id(peer_index);
                Some(format_compat(self.timestamp, peer, &route))
            } else {
                None
            };
            if let Some(line) = line {
                writeln!(self.out, "{}", line)?;
            }

            if modes.contains(Modes::STAT) {
                self.stats.fold(peer_index, &route);
            }
            if modes.intersects(Modes::NEEDS_TABLES) {
                if let Some(pos) = self.position(peer_index) {
                    self.selection[pos].insert(rib.sequence_number, route);
                }
            }
        }

        if modes.intersects(Modes::ANY_DIFF) {
            if let [left, right, ..] = self.selection.as_mut_slice() {
                self.diff
                    .compare(rib.sequence_number, left, right, &mut self.out)?;
            }
        }
        Ok(())
    }

    /// Print the per-file reports and reset the per-file counters.
    pub fn finish_file(&mut self) -> Result<(), ParserError> {
        let modes = self.config.modes;
        if modes.contains(Modes::COUNT) {
            writeln!(self.out, "{}", format_count_header(self.counters.len()))?;
            writeln!(
                self.out,
                "{}",
                format_count_row(self.timestamp, self.counters.iter())
            )?;
        }
        if modes.contains(Modes::PLEN_DIST) {
            let indices: Vec<usize> = match self.config.has_selection() {
                true => self
                    .selection
                    .iter()
                    .map(|rib| rib.peer_index as usize)
                    .collect(),
                false => (0..self.counters.len()).collect(),
            };
            for index in indices {
                if let Some(counters) = self.counters.get(index) {
                    writeln!(self.out, "{}", format_plen_row(self.timestamp, counters))?;
                }
            }
        }
        self.counters.iter_mut().for_each(RouteCounters::clear);
        self.out.flush()?;
        Ok(())
    }

    /// Print the end-of-run reports: statistics and lookups.
    pub fn finish(&mut self) -> Result<(), ParserError> {
        if self.config.modes.contains(Modes::DIFF) && self.selection.len() < 2 {
            warn!(
                "diff requested but only {} peer(s) selected",
                self.selection.len()
            );
        }
        if self.config.modes.contains(Modes::STAT) {
            for (index, stat) in self.stats.iter() {
                for line in format_peer_stat(index, stat, self.config.detail) {
                    writeln!(self.out, "{}", line)?;
                }
            }
        }
        if self.config.modes.contains(Modes::LOOKUP) {
            run_lookups(&self.config, &self.selection, &mut self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write> MessageHandler for RibProcessor<W> {
    fn handle_message(&mut self, header: &CommonHeader, payload: Bytes) -> Result<(), ParserError> {
        self.timestamp = header.timestamp;
        match parse_table_dump_v2_message(header.entry_subtype, payload)? {
            TableDumpV2Message::PeerIndexTable(table) => self.handle_peer_table(table),
            TableDumpV2Message::RibAfi(rib) => self.handle_rib(rib),
        }
    }
}
