mod attr_01_origin;
mod attr_02_as_path;
mod attr_03_next_hop;
mod attr_04_med;
mod attr_05_local_pref;
mod attr_07_aggregator;
mod attr_08_communities;
mod attr_14_mp_reach;
mod attr_16_extended_communities;

use bytes::{Buf, Bytes};
use log::{debug, warn};

use crate::models::*;

use crate::error::ParserError;
use crate::parser::bgp::attributes::attr_01_origin::parse_origin;
use crate::parser::bgp::attributes::attr_03_next_hop::parse_next_hop;
use crate::parser::bgp::attributes::attr_04_med::parse_med;
use crate::parser::bgp::attributes::attr_05_local_pref::parse_local_pref;
use crate::parser::bgp::attributes::attr_07_aggregator::parse_aggregator;
use crate::parser::bgp::attributes::attr_08_communities::parse_regular_communities;
use crate::parser::bgp::attributes::attr_14_mp_reach::parse_mp_reach;
use crate::parser::bgp::attributes::attr_16_extended_communities::parse_extended_community;
use crate::parser::ReadUtils;

pub use attr_02_as_path::{encode_as_path, parse_as_path};
pub use attr_14_mp_reach::parse_mp_next_hop;

/// Parse the path attributes block of one RIB entry.
///
/// `data` holds exactly the attribute bytes announced by the entry's
/// attribute length. Every attribute advances by its declared length whether
/// or not its type is understood.
pub fn parse_attributes(mut data: Bytes) -> Result<Vec<AttributeValue>, ParserError> {
    let mut attributes: Vec<AttributeValue> = Vec::with_capacity(8);

    while data.remaining() > 0 {
        let flag = AttrFlags::from_bits_retain(data.read_u8()?);
        let attr_type = AttrType::from(data.read_u8()?);
        let attr_length = match flag.contains(AttrFlags::EXTENDED) {
            false => data.read_u8()? as usize,
            true => data.read_u16()? as usize,
        };

        debug!(
            "reading attribute: type -- {:?}, length -- {}",
            &attr_type, attr_length
        );

        data.require_n_remaining(attr_length, "Attribute")?;
        let attr_data = data.split_to(attr_length);

        let attr = match attr_type {
            AttrType::ORIGIN => parse_origin(attr_data),
            AttrType::AS_PATH => parse_as_path(attr_data).map(AttributeValue::AsPath),
            AttrType::NEXT_HOP => parse_next_hop(attr_data),
            AttrType::MULTI_EXIT_DISCRIMINATOR => parse_med(attr_data),
            AttrType::LOCAL_PREFERENCE => parse_local_pref(attr_data),
            AttrType::ATOMIC_AGGREGATE => Ok(AttributeValue::AtomicAggregate),
            AttrType::AGGREGATOR => parse_aggregator(attr_data),
            AttrType::COMMUNITIES => parse_regular_communities(attr_data),
            AttrType::MP_REACHABLE_NLRI => parse_mp_reach(attr_data),
            AttrType::EXTENDED_COMMUNITIES => parse_extended_community(attr_data),
            attr_type => Ok(AttributeValue::Skipped {
                attr_type,
                length: attr_length,
            }),
        };

        match attr {
            Ok(value) => attributes.push(value),
            Err(e) if flag.contains(AttrFlags::PARTIAL) => {
                // partial optional transitive attributes may be incomplete
                warn!("PARTIAL: {}", e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(attributes)
}

/// Decode an attribute block and fold every value into `route`.
pub fn apply_attributes(route: &mut Route, data: Bytes) -> Result<(), ParserError> {
    for value in parse_attributes(data)? {
        route.apply_attribute(value);
    }
    Ok(())
}
