//! Merkle root over transaction ids
//!
//! Leaves are the digests of the ids. Each layer hashes adjacent pairs; a
//! trailing unpaired node moves up to the next layer unchanged.

use super::{DigestOracle, Hash};

/// Compute the merkle root of an ordered list of transaction ids.
///
/// Returns `None` for an empty list.
pub fn compute_merkle_root<I, S>(oracle: &dyn DigestOracle, ids: I) -> Option<Hash>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let leaves: Vec<Hash> = ids
        .into_iter()
        .map(|id| oracle.digest(id.as_ref().as_bytes()))
        .collect();
    reduce_layers(oracle, leaves)
}

/// Reduce an already-hashed leaf layer to its root
fn reduce_layers(oracle: &dyn DigestOracle, leaves: Vec<Hash>) -> Option<Hash> {
    let mut current_level = leaves;

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));

        for chunk in current_level.chunks(2) {
            match chunk {
                [left, right] => next_level.push(oracle.digest_pair(left, right)),
                [odd] => next_level.push(*odd),
                _ => unreachable!("chunks(2) yields one or two elements"),
            }
        }

        current_level = next_level;
    }

    current_level.pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Blake3Oracle;

    fn ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("TX{i:04}")).collect()
    }

    #[test]
    fn test_empty_merkle_root() {
        let root = compute_merkle_root(&Blake3Oracle, Vec::<String>::new());
        assert!(root.is_none());
    }

    #[test]
    fn test_single_element_is_hashed_id() {
        let root = compute_merkle_root(&Blake3Oracle, ["ABC"]).unwrap();
        assert_eq!(root, Blake3Oracle.digest(b"ABC"));
    }

    #[test]
    fn test_two_elements() {
        let oracle = Blake3Oracle;
        let root = compute_merkle_root(&oracle, ["a", "b"]).unwrap();
        let expected = oracle.digest_pair(&oracle.digest(b"a"), &oracle.digest(b"b"));
        assert_eq!(root, expected);
    }

    #[test]
    fn test_odd_leaf_carried_unchanged() {
        let oracle = Blake3Oracle;
        let (a, b, c) = (oracle.digest(b"a"), oracle.digest(b"b"), oracle.digest(b"c"));

        // [a, b, c] -> [h(ab), c] -> h(h(ab) c); c is never re-hashed on its own
        let expected = oracle.digest_pair(&oracle.digest_pair(&a, &b), &c);
        let root = compute_merkle_root(&oracle, ["a", "b", "c"]).unwrap();
        assert_eq!(root, expected);
    }

    #[test]
    fn test_five_leaves() {
        let oracle = Blake3Oracle;
        let leaves: Vec<Hash> = ["1", "2", "3", "4", "5"]
            .iter()
            .map(|s| oracle.digest(s.as_bytes()))
            .collect();

        let l1 = [
            oracle.digest_pair(&leaves[0], &leaves[1]),
            oracle.digest_pair(&leaves[2], &leaves[3]),
            leaves[4],
        ];
        let l2 = [oracle.digest_pair(&l1[0], &l1[1]), l1[2]];
        let expected = oracle.digest_pair(&l2[0], &l2[1]);

        assert_eq!(
            compute_merkle_root(&oracle, ["1", "2", "3", "4", "5"]),
            Some(expected)
        );
    }

    #[test]
    fn test_merkle_root_deterministic_and_order_sensitive() {
        let ids = ids(10);
        let root1 = compute_merkle_root(&Blake3Oracle, &ids);
        let root2 = compute_merkle_root(&Blake3Oracle, &ids);
        assert_eq!(root1, root2);

        let mut reversed = ids.clone();
        reversed.reverse();
        assert_ne!(root1, compute_merkle_root(&Blake3Oracle, &reversed));
    }
}
