/*!
`bgpkit-ribdump` reads MRT TABLE_DUMP_V2 routing table dumps and builds
per-peer longest-prefix-match route tables from them.

A dump is framed record by record ([parser::MrtFramer]), each record is
decoded into a peer index table or one prefix's RIB entries, and the decoded
routes are printed, counted, stored in [ptree::PrefixTree]s, compared
between two peers ([diff::RouteDiffEngine]) or folded into per-peer
statistics ([peerstat::PeerStatAggregator]).

## Example

```no_run
use bgpkit_ribdump::config::{Config, Modes};
use bgpkit_ribdump::io::{open_input, process_input};
use bgpkit_ribdump::parser::MrtFramer;
use bgpkit_ribdump::rib::RibProcessor;

let config = Config {
    modes: Modes::BRIEF,
    peer_indices: vec![0],
    ..Default::default()
}
.resolve()
.unwrap();
let mut framer = MrtFramer::with_capacity(config.buffer_size);
let mut processor = RibProcessor::new(config, std::io::stdout());

let mut reader = open_input("rib.20240101.0000.bz2").unwrap();
process_input(&mut reader, &mut framer, &mut processor).unwrap();
processor.finish_file().unwrap();
processor.finish().unwrap();
```

## Supported RFCs

- [X] [RFC 6396](https://datatracker.ietf.org/doc/html/rfc6396): MRT Routing Information Export Format, TABLE_DUMP_V2 PEER_INDEX_TABLE, RIB_IPV4_UNICAST and RIB_IPV6_UNICAST
- [X] [RFC 4271](https://datatracker.ietf.org/doc/html/rfc4271): BGP-4 path attributes
- [X] [RFC 4760](https://datatracker.ietf.org/doc/html/rfc4760): MP_REACH_NLRI next hops
- [X] [RFC 1997](https://datatracker.ietf.org/doc/html/rfc1997): Communities
- [X] [RFC 4360](https://datatracker.ietf.org/doc/html/rfc4360): Extended Communities (decoded, not retained)
*/

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod peerstat;
pub mod ptree;

#[cfg(feature = "parser")]
pub mod diff;
#[cfg(feature = "parser")]
pub mod encoder;
#[cfg(feature = "parser")]
pub mod io;
#[cfg(feature = "parser")]
pub mod parser;
#[cfg(feature = "parser")]
pub mod query;
#[cfg(feature = "parser")]
pub mod rib;

pub use error::ParserError;
