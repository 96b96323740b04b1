use crate::ptree::*;

fn keys_in_order<T>(tree: &PrefixTree<T>) -> Vec<(Vec<u8>, u16)> {
    tree.iter()
        .map(|(_, node)| (node.key().to_vec(), node.keylen()))
        .collect()
}

#[test]
fn test_exact_match() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10], 8, "10/8");
    tree.insert(&[10, 0], 9, "10.0/9");
    tree.insert(&[10, 128], 9, "10.128/9");

    assert_eq!(tree.get(&[10], 8), Some(&"10/8"));
    assert_eq!(tree.get(&[10, 0x80, 0x12], 9), Some(&"10.128/9"));
    assert_eq!(tree.get(&[10, 0, 0, 0], 16), None);
    assert_eq!(tree.get(&[11], 8), None);
    assert_eq!(tree.len(), 3);
}

#[test]
fn test_insert_replaces_payload() {
    let mut tree = PrefixTree::new();
    let first = tree.insert(&[192, 0, 2], 24, 1);
    let second = tree.insert(&[192, 0, 2, 99], 24, 2);
    assert_eq!(first, second);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.data(first), Some(&2));
}

#[test]
fn test_insert_ancestor_of_existing_key() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10, 1], 16, "10.1/16");
    tree.insert(&[10], 8, "10/8");

    let head = tree.head().unwrap();
    assert_eq!(tree.node(head).keylen(), 8);
    assert_eq!(tree.data(head), Some(&"10/8"));

    let child = tree.node(head).child(0).unwrap();
    assert_eq!(tree.node(child).keylen(), 16);
    assert_eq!(tree.node(child).parent(), Some(head));
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn test_insert_below_existing_key() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10], 8, "10/8");
    tree.insert(&[10, 1], 16, "10.1/16");

    assert_eq!(tree.node_count(), 2);
    assert_eq!(
        keys_in_order(&tree),
        vec![(vec![10], 8), (vec![10, 1], 16)]
    );
}

#[test]
fn test_insert_creates_branching_node() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10], 8, "10/8");
    tree.insert(&[192, 168], 16, "192.168/16");

    // 10 = 0000_1010 and 192 = 1100_0000 diverge at the very first bit
    let head = tree.head().unwrap();
    assert_eq!(tree.node(head).keylen(), 0);
    assert!(tree.node(head).data().is_none());
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.len(), 2);

    // branching nodes are never returned
    assert!(tree.lookup_exact(&[], 0).is_none());
    assert!(tree.lookup_longest_prefix(&[172, 16, 0, 1], 32).is_none());

    let found = tree.lookup_longest_prefix(&[10, 1, 2, 3], 32).unwrap();
    assert_eq!(tree.data(found), Some(&"10/8"));
}

#[test]
fn test_branch_at_partial_byte() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10, 0], 16, 0);
    tree.insert(&[10, 1], 16, 1);

    let head = tree.head().unwrap();
    assert_eq!(tree.node(head).keylen(), 15);
    assert_eq!(tree.node(head).key(), &[10, 0]);
    assert_eq!(tree.get(&[10, 0], 16), Some(&0));
    assert_eq!(tree.get(&[10, 1], 16), Some(&1));
}

#[test]
fn test_longest_prefix_match() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10], 8, 8);
    tree.insert(&[10, 1], 16, 16);
    tree.insert(&[10, 1, 2], 24, 24);

    let lpm = |key: &[u8], keylen| {
        tree.lookup_longest_prefix(key, keylen)
            .and_then(|id| tree.data(id))
            .copied()
    };
    assert_eq!(lpm(&[10, 1, 2, 3], 32), Some(24));
    assert_eq!(lpm(&[10, 1, 3, 1], 32), Some(16));
    assert_eq!(lpm(&[10, 2, 0, 0], 32), Some(8));
    assert_eq!(lpm(&[11, 0, 0, 0], 32), None);
    // the query length bounds the match
    assert_eq!(lpm(&[10, 1, 2, 3], 16), Some(16));
    assert_eq!(lpm(&[10, 1, 2, 3], 12), Some(8));
}

#[test]
fn test_default_route() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10], 8, "10/8");
    tree.insert(&[], 0, "default");

    let head = tree.head().unwrap();
    assert_eq!(tree.data(head), Some(&"default"));

    let found = tree.lookup_longest_prefix(&[203, 0, 113, 1], 32).unwrap();
    assert_eq!(tree.data(found), Some(&"default"));
    assert_eq!(tree.get(&[0, 0, 0, 0], 0), Some(&"default"));
}

#[test]
fn test_preorder_iteration() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10, 128], 9, ());
    tree.insert(&[], 0, ());
    tree.insert(&[10, 0], 9, ());
    tree.insert(&[10], 8, ());

    assert_eq!(
        keys_in_order(&tree),
        vec![
            (vec![], 0),
            (vec![10], 8),
            (vec![10, 0], 9),
            (vec![10, 128], 9),
        ]
    );

    // restartable
    let iter = tree.iter();
    assert_eq!(iter.clone().count(), iter.count());
}

#[test]
fn test_clearing_payloads_keeps_order() {
    let mut tree = PrefixTree::new();
    for (i, octet) in [1u8, 64, 65, 128, 200, 201, 255].iter().enumerate() {
        tree.insert(&[*octet], 8, i);
        tree.insert(&[*octet, 7], 16, i + 100);
    }
    let before: Vec<NodeId> = tree.iter().map(|(id, _)| id).collect();

    let mut visited = vec![];
    let mut cursor = tree.head();
    while let Some(id) = cursor {
        tree.take_data(id);
        visited.push(id);
        cursor = tree.next_node(id);
    }

    assert_eq!(before, visited);
    assert!(tree.is_empty());
    let after: Vec<NodeId> = tree.iter().map(|(id, _)| id).collect();
    assert_eq!(before, after);
}

#[test]
fn test_remove() {
    let mut tree = PrefixTree::new();
    let a = tree.insert(&[10, 0], 16, "a");
    let b = tree.insert(&[10, 1], 16, "b");
    let branch = tree.head().unwrap();

    assert_eq!(tree.remove(a), Err(RemoveError::HasPayload));
    assert_eq!(tree.remove(branch), Err(RemoveError::Branching));

    // stub node
    tree.take_data(b);
    assert_eq!(tree.remove(b), Ok(()));
    assert_eq!(tree.node_count(), 2);

    // degree-1 root collapses onto its child
    assert_eq!(tree.remove(branch), Ok(()));
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.head(), Some(a));
    assert_eq!(tree.node(a).parent(), None);
    assert_eq!(tree.get(&[10, 0], 16), Some(&"a"));
}

#[test]
fn test_remove_relinks_child_to_parent() {
    let mut tree = PrefixTree::new();
    let root = tree.insert(&[], 0, 0);
    let mid = tree.insert(&[10], 8, 8);
    let leaf = tree.insert(&[10, 1], 16, 16);

    tree.take_data(mid);
    assert_eq!(tree.remove(mid), Ok(()));
    assert_eq!(tree.node(leaf).parent(), Some(root));
    assert_eq!(tree.node(root).child(0), Some(leaf));

    let found = tree.lookup_longest_prefix(&[10, 1, 0, 1], 32).unwrap();
    assert_eq!(found, leaf);
    let found = tree.lookup_longest_prefix(&[10, 2, 0, 1], 32).unwrap();
    assert_eq!(found, root);
}

#[test]
fn test_drain() {
    let mut tree = PrefixTree::new();
    tree.insert(&[10, 1], 16, 2);
    tree.insert(&[10], 8, 1);
    tree.insert(&[192, 168], 16, 3);

    assert_eq!(tree.drain(), vec![1, 2, 3]);
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 0);
    assert!(tree.head().is_none());

    // arena storage is reused
    tree.insert(&[172, 16], 12, 4);
    assert_eq!(tree.get(&[172, 16], 12), Some(&4));
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_long_keys() {
    let path_a: Vec<u8> = (0..64u32).flat_map(|asn| (64500 + asn).to_be_bytes()).collect();
    let mut path_b = path_a.clone();
    *path_b.last_mut().unwrap() ^= 1;

    let mut tree = PrefixTree::new();
    tree.insert(&path_a, 2048, 1u64);
    tree.insert(&path_b, 2048, 2u64);
    tree.insert(&path_a[..8], 64, 3u64);

    assert_eq!(tree.get(&path_a, 2048), Some(&1));
    assert_eq!(tree.get(&path_b, 2048), Some(&2));
    assert_eq!(tree.get(&path_a, 64), Some(&3));
    assert_eq!(tree.get(&path_a, 2047), None);
}

#[test]
fn test_deep_chain() {
    let key = [0xffu8; 16];
    let mut tree = PrefixTree::new();
    for len in (0..=128u16).rev() {
        tree.insert(&key, len, len);
    }
    assert_eq!(tree.len(), 129);
    assert_eq!(tree.node_count(), 129);

    let depths: Vec<u16> = tree.values().map(|(_, len)| *len).collect();
    assert_eq!(depths, (0..=128).collect::<Vec<_>>());

    assert_eq!(tree.drain().len(), 129);
}
