use bgpkit_ribdump::encoder::MrtRibEncoder;
use bgpkit_ribdump::models::{Peer, Route};
use bgpkit_ribdump::parser::MrtFramer;
use bgpkit_ribdump::ptree::{addr_key, net_key, PrefixTree};
use bgpkit_ribdump::rib::RibProcessor;
use bgpkit_ribdump::config::{Config, Modes};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use ipnet::{IpNet, Ipv4Net};
use std::hint::black_box;
use std::net::{IpAddr, Ipv4Addr};

const PREFIX_COUNT: u32 = 50_000;

/// Deterministic mix of /8 to /24 prefixes spread over the IPv4 space.
fn prefixes() -> Vec<IpNet> {
    let mut state = 0x9e37_79b9u32;
    (0..PREFIX_COUNT)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let len = 8 + (state % 17) as u8;
            let net = Ipv4Net::new(Ipv4Addr::from(state), len).unwrap().trunc();
            IpNet::V4(net)
        })
        .collect()
}

fn build_tree(prefixes: &[IpNet]) -> PrefixTree<usize> {
    let mut tree = PrefixTree::new();
    for (i, prefix) in prefixes.iter().enumerate() {
        let (key, keylen) = net_key(prefix);
        tree.insert(&key, keylen, i);
    }
    tree
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let prefixes = prefixes();

    c.bench_function("ptree insert", |b| {
        b.iter(|| black_box(build_tree(&prefixes)))
    });

    let tree = build_tree(&prefixes);
    let queries: Vec<IpAddr> = prefixes
        .iter()
        .map(|p| IpAddr::V4(Ipv4Addr::from(u32::from_be_bytes(match p.addr() {
            IpAddr::V4(v4) => v4.octets(),
            IpAddr::V6(_) => [0; 4],
        }) | 0x55)))
        .collect();
    c.bench_function("ptree longest prefix lookup", |b| {
        b.iter(|| {
            let mut found = 0;
            for addr in &queries {
                let (key, keylen) = addr_key(addr);
                if tree.lookup_longest_prefix(&key, keylen).is_some() {
                    found += 1;
                }
            }
            black_box(found)
        })
    });

    let mut encoder = MrtRibEncoder::new(1700000000);
    let peer = encoder.add_peer(Peer::new(
        Ipv4Addr::new(10, 0, 0, 1),
        IpAddr::V4(Ipv4Addr::new(192, 0, 2, 254)),
        64500,
    ));
    for prefix in prefixes.iter().take(10_000) {
        let mut route = Route::new(*prefix);
        route.nexthop = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
        route.as_path.extend([64500, 64501, 64502]);
        encoder.add_route(peer, &route);
    }
    let dump = encoder.export_bytes();

    c.bench_function("rib table build", |b| {
        b.iter_batched(
            || {
                Config {
                    modes: Modes::LOOKUP,
                    peer_indices: vec![0],
                    ..Default::default()
                }
                .resolve()
                .unwrap()
            },
            |config| {
                let mut processor = RibProcessor::new(config, std::io::sink());
                let mut framer = MrtFramer::with_capacity(dump.len());
                framer.extend_from_slice(&dump);
                framer.frame(&mut processor).unwrap();
                black_box(processor.selection()[0].route_count())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
