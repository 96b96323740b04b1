/*!
Provides bounds-checked readers for big-endian fields and the structs built from them.
*/
use ipnet::IpNet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::ParserError;
use crate::models::*;
use bytes::{Buf, Bytes};

impl ReadUtils for Bytes {}
impl ReadUtils for &[u8] {}

/// Every read checks the remaining length first and reports an overrun as
/// [ParserError::TruncatedMsg] instead of panicking.
pub trait ReadUtils: Buf {
    #[inline]
    fn has_n_remaining(&self, n: usize) -> Result<(), ParserError> {
        self.require_n_remaining(n, "field")
    }

    #[inline]
    fn require_n_remaining(&self, n: usize, target: &str) -> Result<(), ParserError> {
        if self.remaining() >= n {
            return Ok(());
        }
        Err(ParserError::TruncatedMsg(format!(
            "{} needs {} bytes, {} remaining",
            target,
            n,
            self.remaining()
        )))
    }

    #[inline]
    fn expect_remaining_eq(&self, n: usize, target: &str) -> Result<(), ParserError> {
        if self.remaining() == n {
            return Ok(());
        }
        Err(ParserError::ParseError(format!(
            "{} expects {} bytes, found {}",
            target,
            n,
            self.remaining()
        )))
    }

    #[inline]
    fn read_u8(&mut self) -> Result<u8, ParserError> {
        self.has_n_remaining(1)?;
        Ok(self.get_u8())
    }

    #[inline]
    fn read_u16(&mut self) -> Result<u16, ParserError> {
        self.has_n_remaining(2)?;
        Ok(self.get_u16())
    }

    #[inline]
    fn read_u32(&mut self) -> Result<u32, ParserError> {
        self.has_n_remaining(4)?;
        Ok(self.get_u32())
    }

    fn read_address(&mut self, afi: &Afi) -> Result<IpAddr, ParserError> {
        match afi {
            Afi::Ipv4 => self.read_ipv4_address().map(IpAddr::V4),
            Afi::Ipv6 => self.read_ipv6_address().map(IpAddr::V6),
        }
    }

    fn read_ipv4_address(&mut self) -> Result<Ipv4Addr, ParserError> {
        let addr = self.read_u32()?;
        Ok(Ipv4Addr::from(addr))
    }

    fn read_ipv6_address(&mut self) -> Result<Ipv6Addr, ParserError> {
        self.has_n_remaining(16)?;
        let buf = self.get_u128();
        Ok(Ipv6Addr::from(buf))
    }

    #[inline]
    fn read_asn(&mut self, as_length: AsnLength) -> Result<u32, ParserError> {
        match as_length {
            AsnLength::Bits16 => self.read_u16().map(u32::from),
            AsnLength::Bits32 => self.read_u32(),
        }
    }

    fn read_asns(&mut self, as_length: AsnLength, count: usize) -> Result<Vec<u32>, ParserError> {
        let width = match as_length {
            AsnLength::Bits16 => 2,
            AsnLength::Bits32 => 4,
        };
        self.require_n_remaining(count * width, "AS numbers")?;
        (0..count).map(|_| self.read_asn(as_length)).collect()
    }

    fn read_afi(&mut self) -> Result<Afi, ParserError> {
        Afi::try_from(self.read_u16()?).map_err(ParserError::from)
    }

    /// Read a prefix encoded as a one-byte bit length followed by the minimum
    /// number of bytes holding that many bits.
    fn read_prefix(&mut self, afi: &Afi) -> Result<IpNet, ParserError> {
        let bit_len = self.read_u8()?;
        let byte_len = (bit_len as usize).div_ceil(8);
        let max_len = match afi {
            Afi::Ipv4 => 32,
            Afi::Ipv6 => 128,
        };
        if bit_len > max_len {
            return Err(ParserError::ParseError(format!(
                "invalid prefix length {} for {:?}",
                bit_len, afi
            )));
        }
        self.require_n_remaining(byte_len, "prefix")?;

        let mut buff = [0u8; 16];
        self.copy_to_slice(&mut buff[..byte_len]);
        let addr = match afi {
            Afi::Ipv4 => IpAddr::V4(Ipv4Addr::new(buff[0], buff[1], buff[2], buff[3])),
            Afi::Ipv6 => IpAddr::V6(Ipv6Addr::from(buff)),
        };
        IpNet::new(addr, bit_len)
            .map(|net| net.trunc())
            .map_err(|_| ParserError::ParseError(format!("invalid prefix length {}", bit_len)))
    }

    fn read_n_bytes(&mut self, n_bytes: usize) -> Result<Vec<u8>, ParserError> {
        self.has_n_remaining(n_bytes)?;
        Ok(self.copy_to_bytes(n_bytes).into())
    }

    fn skip_n_bytes(&mut self, n_bytes: usize) -> Result<(), ParserError> {
        self.has_n_remaining(n_bytes)?;
        self.advance(n_bytes);
        Ok(())
    }
}
