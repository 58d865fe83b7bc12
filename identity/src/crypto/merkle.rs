//! # Merkle Batches
//!
//! Many operation hashes can be anchored under one root, and each one
//! proven afterwards with a short inclusion proof. The layout is the one
//! PRISM nodes already verify against, so it is fixed:
//!
//! ```text
//! leaf  = SHA-256(0x00 || data)
//! node  = SHA-256(0x01 || left || right)
//! ```
//!
//! The prefixes keep a leaf from ever being read as an internal node. Leaves
//! are paired left to right; an odd one out is carried up a level unchanged,
//! so the tree need not be full but stays O(log n) deep.
//!
//! A proof's `index` is a bitmask read from the root down: bit `i` set means
//! the leaf is in the right subtree of the node at depth `i`. Its
//! `siblings` run the other way, bottom first.

use serde::{Deserialize, Serialize};

use super::hash::Sha256Digest;
use super::keys::CryptoError;

const LEAF_PREFIX: u8 = 0;
const NODE_PREFIX: u8 = 1;

/// Trees are capped at 2^31 leaves, so a proof has at most 30 siblings.
const MAX_PROOF_LENGTH: usize = 31;

fn prefix_hash(data: &Sha256Digest) -> Sha256Digest {
    let mut buf = [0u8; 33];
    buf[0] = LEAF_PREFIX;
    buf[1..].copy_from_slice(data.as_bytes());
    Sha256Digest::compute(&buf)
}

fn combine_hashes(left: &Sha256Digest, right: &Sha256Digest) -> Sha256Digest {
    let mut buf = [0u8; 65];
    buf[0] = NODE_PREFIX;
    buf[1..33].copy_from_slice(left.as_bytes());
    buf[33..].copy_from_slice(right.as_bytes());
    Sha256Digest::compute(&buf)
}

/// Root of a Merkle batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MerkleRoot(pub Sha256Digest);

impl MerkleRoot {
    pub fn hash(&self) -> &Sha256Digest {
        &self.0
    }
}

/// Proof that `hash` is one of the leaves under some root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleInclusionProof {
    pub hash: Sha256Digest,
    pub index: u32,
    pub siblings: Vec<Sha256Digest>,
}

/// JSON shape of a proof: hex digests, integer index.
#[derive(Serialize, Deserialize)]
struct EncodedProof {
    hash: String,
    index: u32,
    siblings: Vec<String>,
}

impl MerkleInclusionProof {
    /// The root this proof leads to. Doesn't say whether that root is the
    /// one you trust; see [`verify_proof`].
    pub fn derived_root(&self) -> MerkleRoot {
        let n = self.siblings.len();
        let root = self
            .siblings
            .iter()
            .enumerate()
            .fold(prefix_hash(&self.hash), |current, (i, sibling)| {
                let goes_right = self
                    .index
                    .checked_shr((n - i - 1) as u32)
                    .is_some_and(|bits| bits & 1 == 1);
                if goes_right {
                    combine_hashes(sibling, &current)
                } else {
                    combine_hashes(&current, sibling)
                }
            });
        MerkleRoot(root)
    }

    /// `{"hash": "<hex>", "index": n, "siblings": ["<hex>", ...]}`
    pub fn encode(&self) -> String {
        let encoded = EncodedProof {
            hash: self.hash.hex_value(),
            index: self.index,
            siblings: self.siblings.iter().map(Sha256Digest::hex_value).collect(),
        };
        // A struct of strings and an integer always serializes.
        serde_json::to_string(&encoded).unwrap_or_default()
    }

    pub fn decode(encoded: &str) -> Result<Self, CryptoError> {
        let invalid = |e: String| CryptoError::InvalidMerkleProof(e);
        let raw: EncodedProof =
            serde_json::from_str(encoded).map_err(|e| invalid(e.to_string()))?;
        let hash = Sha256Digest::from_hex(&raw.hash).map_err(|e| invalid(e.to_string()))?;
        let siblings = raw
            .siblings
            .iter()
            .map(|s| Sha256Digest::from_hex(s).map_err(|e| invalid(e.to_string())))
            .collect::<Result<_, _>>()?;
        Ok(Self {
            hash,
            index: raw.index,
            siblings,
        })
    }
}

/// A root together with one proof per leaf, in leaf order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProofs {
    pub root: MerkleRoot,
    pub proofs: Vec<MerkleInclusionProof>,
}

enum Tree {
    Leaf {
        data: Sha256Digest,
        hash: Sha256Digest,
    },
    Node {
        hash: Sha256Digest,
        left: Box<Tree>,
        right: Box<Tree>,
    },
}

impl Tree {
    fn hash(&self) -> &Sha256Digest {
        match self {
            Tree::Leaf { hash, .. } | Tree::Node { hash, .. } => hash,
        }
    }

    fn build(hashes: &[Sha256Digest]) -> Option<Tree> {
        let mut level: Vec<Tree> = hashes
            .iter()
            .map(|data| Tree::Leaf {
                data: *data,
                hash: prefix_hash(data),
            })
            .collect();

        while level.len() > 1 {
            let mut next = Vec::with_capacity(level.len() / 2 + 1);
            let mut nodes = level.into_iter();
            while let Some(left) = nodes.next() {
                match nodes.next() {
                    Some(right) => next.push(Tree::Node {
                        hash: combine_hashes(left.hash(), right.hash()),
                        left: Box::new(left),
                        right: Box::new(right),
                    }),
                    None => next.push(left),
                }
            }
            level = next;
        }
        level.pop()
    }

    fn collect_proofs(
        &self,
        index: u32,
        path: &[Sha256Digest],
        out: &mut Vec<MerkleInclusionProof>,
    ) {
        match self {
            Tree::Leaf { data, .. } => out.push(MerkleInclusionProof {
                hash: *data,
                index,
                siblings: path.to_vec(),
            }),
            Tree::Node { left, right, .. } => {
                let with = |sibling: &Sha256Digest| {
                    let mut siblings = Vec::with_capacity(path.len() + 1);
                    siblings.push(*sibling);
                    siblings.extend_from_slice(path);
                    siblings
                };
                left.collect_proofs(index, &with(right.hash()), out);
                right.collect_proofs(index | (1 << path.len()), &with(left.hash()), out);
            }
        }
    }
}

/// Build the tree over `hashes` and a proof for each of them.
pub fn generate_proofs(hashes: &[Sha256Digest]) -> Result<MerkleProofs, CryptoError> {
    let tree = Tree::build(hashes).ok_or(CryptoError::EmptyMerkleTree)?;
    let mut proofs = Vec::with_capacity(hashes.len());
    tree.collect_proofs(0, &[], &mut proofs);
    Ok(MerkleProofs {
        root: MerkleRoot(*tree.hash()),
        proofs,
    })
}

/// Whether `proof` leads to `root`.
pub fn verify_proof(root: &MerkleRoot, proof: &MerkleInclusionProof) -> bool {
    proof.siblings.len() < MAX_PROOF_LENGTH && proof.derived_root() == *root
}
