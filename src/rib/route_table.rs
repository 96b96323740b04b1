//! Sequence-number indexed route storage of one selected peer.
use crate::config::OverflowPolicy;
use crate::models::{DiffFlag, Route};
use crate::ptree::{addr_key, net_key, PrefixTree};
use ipnet::IpNet;
use log::warn;
use std::net::IpAddr;

/// Routes of one peer, indexed by RIB sequence number.
///
/// Slots are allocated on demand up to `capacity`. Past that the
/// [OverflowPolicy] decides between storing into the last slot and growing.
#[derive(Debug)]
pub struct RouteTable {
    slots: Vec<Option<Route>>,
    capacity: usize,
    policy: OverflowPolicy,
    overflows: u64,
}

impl RouteTable {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        RouteTable {
            slots: Vec::new(),
            capacity: capacity.max(1),
            policy,
            overflows: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Writes that did not fit the configured capacity.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }

    /// Slot a sequence number maps to, applying the overflow policy.
    fn slot_for(&mut self, sequence_number: u32) -> usize {
        let seq = sequence_number as usize;
        if seq < self.capacity {
            return seq;
        }
        self.overflows += 1;
        match self.policy {
            OverflowPolicy::Clamp => {
                warn!(
                    "route table overflow: sequence number {} beyond capacity {}",
                    sequence_number, self.capacity
                );
                self.capacity - 1
            }
            OverflowPolicy::Grow => {
                self.capacity = seq + 1;
                seq
            }
        }
    }

    /// Store `route` for `sequence_number` and return the slot used.
    pub fn insert(&mut self, sequence_number: u32, route: Route) -> usize {
        self.replace(sequence_number, route).0
    }

    /// Like [RouteTable::insert], also handing back the route the slot held.
    pub fn replace(&mut self, sequence_number: u32, route: Route) -> (usize, Option<Route>) {
        let slot = self.slot_for(sequence_number);
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        (slot, self.slots[slot].replace(route))
    }

    pub fn get(&self, slot: usize) -> Option<&Route> {
        self.slots.get(slot).and_then(|r| r.as_ref())
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Route> {
        self.slots.get_mut(slot).and_then(|r| r.as_mut())
    }

    /// Route stored for `sequence_number`, without applying the overflow policy.
    pub fn get_by_sequence(&self, sequence_number: u32) -> Option<&Route> {
        let seq = sequence_number as usize;
        match self.policy {
            OverflowPolicy::Clamp if seq >= self.capacity => self.get(self.capacity - 1),
            _ => self.get(seq),
        }
    }

    /// Slot index `sequence_number` reads from.
    pub fn slot_of(&self, sequence_number: u32) -> usize {
        let seq = sequence_number as usize;
        match self.policy {
            OverflowPolicy::Clamp => seq.min(self.capacity - 1),
            OverflowPolicy::Grow => seq,
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|r| r.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|r| r.is_none())
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Route)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, r)| r.as_ref().map(|r| (slot, r)))
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.overflows = 0;
    }
}

/// Route table of one selected peer together with its trees, one per
/// address family. Tree payloads are slot indices into the table.
#[derive(Debug)]
pub struct PeerRib {
    pub peer_index: u16,
    pub table: RouteTable,
    ipv4: PrefixTree<usize>,
    ipv6: PrefixTree<usize>,
}

impl PeerRib {
    pub fn new(peer_index: u16, capacity: usize, policy: OverflowPolicy) -> Self {
        PeerRib {
            peer_index,
            table: RouteTable::new(capacity, policy),
            ipv4: PrefixTree::new(),
            ipv6: PrefixTree::new(),
        }
    }

    pub fn tree(&self, ipv4: bool) -> &PrefixTree<usize> {
        match ipv4 {
            true => &self.ipv4,
            false => &self.ipv6,
        }
    }

    fn tree_mut(&mut self, ipv4: bool) -> &mut PrefixTree<usize> {
        match ipv4 {
            true => &mut self.ipv4,
            false => &mut self.ipv6,
        }
    }

    /// Store `route` at its sequence number and index it by prefix.
    ///
    /// A route displaced from its slot is unindexed, unless its tree node
    /// has since been pointed at another slot.
    pub fn insert(&mut self, sequence_number: u32, route: Route) -> usize {
        let (key, keylen) = route.key();
        let ipv4 = route.is_ipv4();
        let (slot, displaced) = self.table.replace(sequence_number, route);
        if let Some(old) = displaced {
            let (old_key, old_keylen) = old.key();
            let tree = self.tree_mut(old.is_ipv4());
            if let Some(id) = tree.lookup_exact(&old_key, old_keylen) {
                if tree.data(id) == Some(&slot) {
                    tree.take_data(id);
                }
            }
        }
        self.tree_mut(ipv4).insert(&key, keylen, slot);
        slot
    }

    pub fn route_at(&self, sequence_number: u32) -> Option<&Route> {
        self.table.get_by_sequence(sequence_number)
    }

    pub fn route_at_mut(&mut self, sequence_number: u32) -> Option<&mut Route> {
        let slot = self.table.slot_of(sequence_number);
        self.table.get_mut(slot)
    }

    /// Longest-prefix match of a host address.
    pub fn lookup_addr(&self, addr: &IpAddr) -> Option<&Route> {
        let (key, keylen) = addr_key(addr);
        let tree = self.tree(addr.is_ipv4());
        let id = tree.lookup_longest_prefix(&key, keylen)?;
        tree.data(id).and_then(|slot| self.table.get(*slot))
    }

    /// Longest-prefix match of the first `prefix_len` bits of `prefix`.
    pub fn lookup_covering(&self, prefix: &IpNet, prefix_len: u8) -> Option<&Route> {
        let (key, _) = net_key(prefix);
        let tree = self.tree(matches!(prefix, IpNet::V4(_)));
        let id = tree.lookup_longest_prefix(&key, prefix_len as u16)?;
        tree.data(id).and_then(|slot| self.table.get(*slot))
    }

    /// Flag of the route covering `prefix` at `prefix_len`, if any route does.
    pub fn covering_flag(&self, prefix: &IpNet, prefix_len: u8) -> Option<Option<DiffFlag>> {
        self.lookup_covering(prefix, prefix_len)
            .map(|route| route.diff_flag)
    }

    /// Routes indexed in the tree of one address family, in tree order.
    pub fn tree_routes(&self, ipv4: bool) -> impl Iterator<Item = &Route> + '_ {
        self.tree(ipv4)
            .values()
            .filter_map(|(_, slot)| self.table.get(*slot))
    }

    /// Number of routes indexed in both trees.
    pub fn route_count(&self) -> usize {
        self.ipv4.len() + self.ipv6.len()
    }

    pub fn clear(&mut self) {
        self.table.clear();
        self.ipv4.clear();
        self.ipv6.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn route(prefix: &str) -> Route {
        Route::new(IpNet::from_str(prefix).unwrap())
    }

    #[test]
    fn test_clamp_policy() {
        let mut table = RouteTable::new(4, OverflowPolicy::Clamp);
        assert_eq!(table.insert(1, route("10.0.0.0/8")), 1);
        assert_eq!(table.insert(9, route("11.0.0.0/8")), 3);
        assert_eq!(table.insert(12, route("12.0.0.0/8")), 3);
        assert_eq!(table.overflows(), 2);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get_by_sequence(100).unwrap().prefix,
            IpNet::from_str("12.0.0.0/8").unwrap()
        );
        assert!(table.get(0).is_none());
    }

    #[test]
    fn test_clamped_write_unindexes_displaced_route() {
        let mut rib = PeerRib::new(0, 2, OverflowPolicy::Clamp);
        assert_eq!(rib.insert(1, route("10.0.0.0/8")), 1);
        assert_eq!(rib.insert(5, route("192.0.2.0/24")), 1);

        assert!(rib.lookup_addr(&IpAddr::from_str("10.1.2.3").unwrap()).is_none());
        let found = rib.lookup_addr(&IpAddr::from_str("192.0.2.7").unwrap()).unwrap();
        assert_eq!(found.prefix, IpNet::from_str("192.0.2.0/24").unwrap());
        assert_eq!(rib.route_count(), 1);

        // the same prefix already moved to another slot keeps that slot
        let mut rib = PeerRib::new(0, 4, OverflowPolicy::Clamp);
        rib.insert(3, route("10.0.0.0/8"));
        rib.insert(0, route("10.0.0.0/8"));
        rib.insert(7, route("2001:db8::/32"));
        let found = rib.lookup_addr(&IpAddr::from_str("10.1.2.3").unwrap()).unwrap();
        assert_eq!(found.prefix, IpNet::from_str("10.0.0.0/8").unwrap());
        assert!(rib.lookup_addr(&IpAddr::from_str("2001:db8::1").unwrap()).is_some());
        assert_eq!(rib.route_count(), 2);
    }

    #[test]
    fn test_grow_policy() {
        let mut table = RouteTable::new(2, OverflowPolicy::Grow);
        assert_eq!(table.insert(10, route("10.0.0.0/8")), 10);
        assert_eq!(table.capacity(), 11);
        assert_eq!(table.overflows(), 1);
        assert!(table.get_by_sequence(10).is_some());
        assert_eq!(table.iter().map(|(slot, _)| slot).collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_peer_rib_lookup() {
        let mut rib = PeerRib::new(0, 16, OverflowPolicy::Clamp);
        rib.insert(0, route("10.0.0.0/8"));
        rib.insert(1, route("10.1.0.0/16"));
        rib.insert(2, route("2001:db8::/32"));
        assert_eq!(rib.route_count(), 3);

        let found = rib.lookup_addr(&IpAddr::from_str("10.1.2.3").unwrap()).unwrap();
        assert_eq!(found.prefix, IpNet::from_str("10.1.0.0/16").unwrap());
        let found = rib.lookup_addr(&IpAddr::from_str("10.2.0.1").unwrap()).unwrap();
        assert_eq!(found.prefix, IpNet::from_str("10.0.0.0/8").unwrap());
        assert!(rib.lookup_addr(&IpAddr::from_str("11.0.0.1").unwrap()).is_none());
        assert!(rib.lookup_addr(&IpAddr::from_str("2001:db8::1").unwrap()).is_some());

        // a /16 probe at 15 bits only sees the /8
        let prefix = IpNet::from_str("10.1.0.0/16").unwrap();
        let found = rib.lookup_covering(&prefix, 15).unwrap();
        assert_eq!(found.prefix_len(), 8);
        assert_eq!(rib.covering_flag(&prefix, 7), None);
    }
}
