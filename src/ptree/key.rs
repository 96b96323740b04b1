//! Bit-level helpers for prefix keys.
//!
//! A key of `keylen` bits is packed most-significant-bit first into
//! `ceil(keylen / 8)` bytes. Bits beyond `keylen` in the last byte are always
//! zero in keys owned by the tree.
use ipnet::IpNet;
use smallvec::SmallVec;
use std::net::IpAddr;

/// Owned key storage. Sixteen bytes inline covers every IPv6 prefix; longer
/// keys (AS path encodings) spill to the heap.
pub type KeyBytes = SmallVec<[u8; 16]>;

pub(crate) const MASK: [u8; 9] = [0x00, 0x80, 0xc0, 0xe0, 0xf0, 0xf8, 0xfc, 0xfe, 0xff];

#[inline]
pub fn key_size(keylen: u16) -> usize {
    (keylen as usize).div_ceil(8)
}

#[inline]
fn byte_at(key: &[u8], index: usize) -> u8 {
    key.get(index).copied().unwrap_or(0)
}

/// Copy the first `keylen` bits of `key` into owned storage with the trailing
/// bits of the partial byte forced to zero. Missing input bytes read as zero.
pub fn make_key(key: &[u8], keylen: u16) -> KeyBytes {
    let size = key_size(keylen);
    let mut bytes: KeyBytes = SmallVec::from_elem(0, size);
    let available = size.min(key.len());
    bytes[..available].copy_from_slice(&key[..available]);
    let rem = (keylen % 8) as usize;
    if rem != 0 {
        bytes[size - 1] &= MASK[rem];
    }
    bytes
}

/// Returns the bit at position `pos`, counting from the most significant bit
/// of the first byte. `check_bit(key, node.keylen)` is the bit just after a
/// node's key.
#[inline]
pub fn check_bit(key: &[u8], pos: u16) -> usize {
    ((byte_at(key, pos as usize / 8) >> (7 - pos % 8)) & 1) as usize
}

/// Returns true iff `a` and `b` are equal in their first `keylen` bits.
pub fn key_match(a: &[u8], b: &[u8], keylen: u16) -> bool {
    let bytes = keylen as usize / 8;
    let bits = (keylen % 8) as usize;
    if (0..bytes).any(|i| byte_at(a, i) != byte_at(b, i)) {
        return false;
    }
    (byte_at(a, bytes) ^ byte_at(b, bytes)) & MASK[bits] == 0
}

/// Length in bits of the longest common prefix of two keys, never more than
/// the shorter of the two lengths.
pub fn common_len(a: &[u8], alen: u16, b: &[u8], blen: u16) -> u16 {
    let min = alen.min(blen);

    let mut nmatch = 0usize;
    while nmatch < min as usize / 8 && byte_at(a, nmatch) == byte_at(b, nmatch) {
        nmatch += 1;
    }

    let mut keylen = (nmatch * 8) as u16;
    let diff = byte_at(a, nmatch) ^ byte_at(b, nmatch);
    let mut bitmask = 0x80u8;
    while keylen < min && diff & bitmask == 0 {
        keylen += 1;
        bitmask >>= 1;
    }
    keylen
}

/// Full-length key of a host address: 32 bits for IPv4, 128 for IPv6.
pub fn addr_key(addr: &IpAddr) -> (KeyBytes, u16) {
    match addr {
        IpAddr::V4(v4) => (SmallVec::from_slice(&v4.octets()), 32),
        IpAddr::V6(v6) => (SmallVec::from_slice(&v6.octets()), 128),
    }
}

/// Key of a network prefix, masked to the prefix length.
pub fn net_key(net: &IpNet) -> (KeyBytes, u16) {
    let len = net.prefix_len() as u16;
    match net.network() {
        IpAddr::V4(v4) => (make_key(&v4.octets(), len), len),
        IpAddr::V6(v6) => (make_key(&v6.octets(), len), len),
    }
}
