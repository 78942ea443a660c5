// Merkle root calculation over ordered leaf hashes

use crate::crypto::Hash;

/// Calculate the merkle root of an ordered list of leaf hashes.
///
/// Binary tree, built bottom-up:
/// - parent nodes are hash(left || right)
/// - an odd node at any level is paired with itself
/// - a single leaf is paired with itself as well
pub fn calculate_merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return Hash::zero();
    }

    let mut hashes: Vec<Hash> = leaves.to_vec();

    if hashes.len() == 1 {
        return hash_pair(&hashes[0], &hashes[0]);
    }

    while hashes.len() > 1 {
        let mut next_level = Vec::with_capacity(hashes.len().div_ceil(2));

        for chunk in hashes.chunks(2) {
            let left = &chunk[0];
            let right = if chunk.len() == 2 { &chunk[1] } else { &chunk[0] };
            next_level.push(hash_pair(left, right));
        }

        hashes = next_level;
    }

    hashes[0].clone()
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    use blake3::Hasher;

    let mut hasher = Hasher::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());

    let result = hasher.finalize();
    Hash::new(*result.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash;

    #[test]
    fn test_empty_merkle_root() {
        assert_eq!(calculate_merkle_root(&[]), Hash::zero());
    }

    #[test]
    fn test_single_leaf() {
        let leaf = hash(b"leaf");
        let root = calculate_merkle_root(std::slice::from_ref(&leaf));
        assert_eq!(root, hash_pair(&leaf, &leaf));
    }

    #[test]
    fn test_two_leaves() {
        let a = hash(b"a");
        let b = hash(b"b");
        let root = calculate_merkle_root(&[a.clone(), b.clone()]);
        assert_eq!(root, hash_pair(&a, &b));
    }

    #[test]
    fn test_three_leaves() {
        let a = hash(b"a");
        let b = hash(b"b");
        let c = hash(b"c");
        let root = calculate_merkle_root(&[a.clone(), b.clone(), c.clone()]);

        // Level 0: [a, b, c]
        // Level 1: [hash(a||b), hash(c||c)]
        // Level 2: hash(hash(a||b) || hash(c||c))
        let ab = hash_pair(&a, &b);
        let cc = hash_pair(&c, &c);
        assert_eq!(root, hash_pair(&ab, &cc));
    }

    #[test]
    fn test_order_matters() {
        let a = hash(b"a");
        let b = hash(b"b");
        assert_ne!(
            calculate_merkle_root(&[a.clone(), b.clone()]),
            calculate_merkle_root(&[b, a])
        );
    }
}
