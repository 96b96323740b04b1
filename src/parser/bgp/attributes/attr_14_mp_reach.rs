use crate::models::*;
use crate::parser::ReadUtils;
use crate::ParserError;
use bytes::{Buf, Bytes};
use log::debug;

/// Parse the next hop part of MP_REACH_NLRI.
///
/// RIB entries usually carry the abbreviated form defined in RFC 6396
/// section 4.3.4, which starts directly with the next hop length. Some
/// writers emit the full RFC 4760 form instead:
///
/// ```text
/// +---------------------------------------------------------+
/// | Address Family Identifier (2 octets)                    |
/// +---------------------------------------------------------+
/// | Subsequent Address Family Identifier (1 octet)          |
/// +---------------------------------------------------------+
/// | Length of Next Hop Network Address (1 octet)            |
/// +---------------------------------------------------------+
/// | Network Address of Next Hop (variable)                  |
/// +---------------------------------------------------------+
/// | Reserved (1 octet)                                      |
/// +---------------------------------------------------------+
/// | Network Layer Reachability Information (variable)       |
/// +---------------------------------------------------------+
/// ```
///
/// A zero first byte can only be the high byte of an AFI, so it selects the
/// full form. NLRI following the next hop is ignored; the prefix comes from the
/// RIB block.
pub fn parse_mp_reach(mut input: Bytes) -> Result<AttributeValue, ParserError> {
    input.require_n_remaining(1, "MP_REACH_NLRI")?;
    if input[0] == 0 {
        let _afi = input.read_u16()?;
        let _safi = input.read_u8()?;
    }
    let next_hop_len = input.read_u8()? as usize;
    input.require_n_remaining(next_hop_len, "MP_REACH_NLRI next hop")?;
    let mut next_hop_bytes = input.split_to(next_hop_len);
    let next_hop = parse_mp_next_hop(&mut next_hop_bytes)?;
    Ok(AttributeValue::MpReachNlri(next_hop))
}

pub fn parse_mp_next_hop(input: &mut Bytes) -> Result<Option<MpNextHop>, ParserError> {
    let next_hop = match input.remaining() {
        4 => Some(MpNextHop::Ipv4(input.read_ipv4_address()?)),
        16 => Some(MpNextHop::Ipv6(input.read_ipv6_address()?)),
        32 => Some(MpNextHop::Ipv6LinkLocal(
            input.read_ipv6_address()?,
            input.read_ipv6_address()?,
        )),
        n => {
            debug!("ignoring MP_REACH_NLRI next hop of {} bytes", n);
            None
        }
    };
    Ok(next_hop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;
    use std::str::FromStr;

    fn v6(s: &str) -> Ipv6Addr {
        Ipv6Addr::from_str(s).unwrap()
    }

    #[test]
    fn test_abbreviated_form() {
        let mut data = vec![16];
        data.extend(v6("2001:db8::1").octets());
        assert_eq!(
            parse_mp_reach(Bytes::from(data)).unwrap(),
            AttributeValue::MpReachNlri(Some(MpNextHop::Ipv6(v6("2001:db8::1"))))
        );
    }

    #[test]
    fn test_full_form_with_link_local() {
        let mut data = vec![0, 2, 1, 32];
        data.extend(v6("2001:db8::1").octets());
        data.extend(v6("fe80::1").octets());
        // reserved byte and an NLRI that is ignored
        data.extend([0, 32, 0x20, 0x01, 0x0d, 0xb8]);
        assert_eq!(
            parse_mp_reach(Bytes::from(data)).unwrap(),
            AttributeValue::MpReachNlri(Some(MpNextHop::Ipv6LinkLocal(
                v6("2001:db8::1"),
                v6("fe80::1")
            )))
        );
    }

    #[test]
    fn test_truncated_next_hop() {
        let data = Bytes::from(vec![16, 0x20, 0x01]);
        assert!(matches!(
            parse_mp_reach(data),
            Err(ParserError::TruncatedMsg(_))
        ));
        assert!(parse_mp_reach(Bytes::new()).is_err());
    }
}
