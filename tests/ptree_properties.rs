use bgpkit_ribdump::ptree::{key_match, make_key, PrefixTree};
use proptest::prelude::*;
use std::collections::HashMap;

fn v4_prefix() -> impl Strategy<Value = (u32, u16)> {
    (any::<u32>(), 0u16..=32)
}

fn masked(addr: u32, len: u16) -> Vec<u8> {
    make_key(&addr.to_be_bytes(), len).to_vec()
}

fn build(prefixes: &[(u32, u16)]) -> PrefixTree<usize> {
    let mut tree = PrefixTree::new();
    for (i, (addr, len)) in prefixes.iter().enumerate() {
        tree.insert(&addr.to_be_bytes(), *len, i);
    }
    tree
}

fn node_keys(tree: &PrefixTree<usize>) -> Vec<(Vec<u8>, u16)> {
    tree.iter()
        .map(|(_, node)| (node.key().to_vec(), node.keylen()))
        .collect()
}

proptest! {
    #[test]
    fn exact_match_iff_inserted(
        keys in prop::collection::vec((prop::collection::vec(any::<u8>(), 16), 0u16..=128), 1..64),
        probes in prop::collection::vec((prop::collection::vec(any::<u8>(), 16), 0u16..=128), 0..32),
    ) {
        let mut tree = PrefixTree::new();
        let mut model = HashMap::new();
        for (i, (key, len)) in keys.iter().enumerate() {
            tree.insert(key, *len, i);
            model.insert((make_key(key, *len).to_vec(), *len), i);
        }
        prop_assert_eq!(tree.len(), model.len());
        for ((key, len), payload) in &model {
            prop_assert_eq!(tree.get(key, *len), Some(payload));
        }
        for (key, len) in &probes {
            let expected = model.get(&(make_key(key, *len).to_vec(), *len));
            prop_assert_eq!(tree.get(key, *len), expected);
        }
    }

    #[test]
    fn longest_prefix_matches_naive_scan(
        prefixes in prop::collection::vec(v4_prefix(), 1..128),
        queries in prop::collection::vec(any::<u32>(), 1..64),
    ) {
        let tree = build(&prefixes);
        for query in queries {
            let qkey = query.to_be_bytes();
            let expected = prefixes
                .iter()
                .filter(|(addr, len)| key_match(&addr.to_be_bytes(), &qkey, *len))
                .map(|(addr, len)| (masked(*addr, *len), *len))
                .max_by_key(|(_, len)| *len);
            let found = tree
                .lookup_longest_prefix(&qkey, 32)
                .map(|id| (tree.node(id).key().to_vec(), tree.node(id).keylen()));
            prop_assert_eq!(found, expected);
        }
    }

    #[test]
    fn insertion_order_does_not_matter(
        prefixes in prop::collection::vec(v4_prefix(), 1..128),
        queries in prop::collection::vec(any::<u32>(), 1..64),
    ) {
        let forward = build(&prefixes);
        let reversed: Vec<_> = prefixes.iter().rev().copied().collect();
        let backward = build(&reversed);

        prop_assert_eq!(node_keys(&forward), node_keys(&backward));
        for query in queries {
            let qkey = query.to_be_bytes();
            let a = forward.lookup_longest_prefix(&qkey, 32).map(|id| forward.node(id).keylen());
            let b = backward.lookup_longest_prefix(&qkey, 32).map(|id| backward.node(id).keylen());
            prop_assert_eq!(a, b);
        }
    }

    #[test]
    fn clearing_payloads_keeps_traversal(prefixes in prop::collection::vec(v4_prefix(), 1..128)) {
        let mut tree = build(&prefixes);
        let before = node_keys(&tree);
        let payload_nodes = tree.iter().filter(|(_, node)| node.data().is_some()).count();
        prop_assert_eq!(payload_nodes, tree.len());

        let mut cursor = tree.head();
        let mut visited = 0;
        while let Some(id) = cursor {
            tree.take_data(id);
            visited += 1;
            cursor = tree.next_node(id);
        }
        prop_assert_eq!(visited, before.len());
        prop_assert_eq!(node_keys(&tree), before);
        prop_assert!(tree.is_empty());
    }
}
