use crate::utils::sha256_digest;

const LEAF_PREFIX: u8 = 0x00;
const INNER_PREFIX: u8 = 0x01;

/// Merkle root over a list of byte vectors (RFC 6962 layout).
///
/// Leaves are hashed as `SHA-256(0x00 || leaf)` and inner nodes as
/// `SHA-256(0x01 || left || right)`. The split point is the largest power of
/// two strictly below the item count, so the root depends on item order.
/// An empty list hashes to `SHA-256("")`.
pub fn simple_hash_from_byte_vectors(items: &[Vec<u8>]) -> Vec<u8> {
    match items.len() {
        0 => sha256_digest(&[]),
        1 => leaf_hash(&items[0]),
        n => {
            let k = split_point(n);
            let left = simple_hash_from_byte_vectors(&items[..k]);
            let right = simple_hash_from_byte_vectors(&items[k..]);
            inner_hash(&left, &right)
        }
    }
}

fn leaf_hash(leaf: &[u8]) -> Vec<u8> {
    let mut data = Vec::with_capacity(leaf.len() + 1);
    data.push(LEAF_PREFIX);
    data.extend_from_slice(leaf);
    sha256_digest(&data)
}

fn inner_hash(left: &[u8], right: &[u8]) -> Vec<u8> {
    let mut combined = Vec::with_capacity(left.len() + right.len() + 1);
    combined.push(INNER_PREFIX);
    combined.extend_from_slice(left);
    combined.extend_from_slice(right);
    sha256_digest(&combined)
}

// largest power of two less than n (n >= 2)
fn split_point(n: usize) -> usize {
    let mut k = 1;
    while k * 2 < n {
        k *= 2;
    }
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        assert_eq!(
            hex::encode(simple_hash_from_byte_vectors(&[])),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_single_leaf_is_prefixed() {
        let root = simple_hash_from_byte_vectors(&[vec![1, 2, 3]]);
        assert_eq!(root, leaf_hash(&[1, 2, 3]));
        assert_ne!(root, sha256_digest(&[1, 2, 3]));
    }

    #[test]
    fn test_split_point() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(9), 8);
    }

    #[test]
    fn test_three_leaves_layout() {
        let items = vec![vec![1], vec![2], vec![3]];
        let expected = inner_hash(
            &inner_hash(&leaf_hash(&[1]), &leaf_hash(&[2])),
            &leaf_hash(&[3]),
        );
        assert_eq!(simple_hash_from_byte_vectors(&items), expected);
    }

    #[test]
    fn test_order_matters() {
        let forward = simple_hash_from_byte_vectors(&[vec![1], vec![2]]);
        let backward = simple_hash_from_byte_vectors(&[vec![2], vec![1]]);
        assert_ne!(forward, backward);
    }
}
