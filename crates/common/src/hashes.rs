pub use bitcoin::hashes::{Hash, sha256d::Hash as Sha256Hash};
pub use bitcoin::{BlockHash, TxMerkleNode, Txid};

use bitcoin::block::Header as BlockHeader;

/// Computes the identifying hash of a block header.
///
/// The header hash function is chain specific and lives outside this crate;
/// the node links its implementation in when it builds the parameter
/// registry. Genesis verification compares the result against the hashes
/// recorded for each network.
pub trait HeaderHasher {
    /// Hashes the 80-byte consensus encoding of `header`.
    fn header_hash(&self, header: &BlockHeader) -> BlockHash;
}

impl<T: HeaderHasher + ?Sized> HeaderHasher for &T {
    fn header_hash(&self, header: &BlockHeader) -> BlockHash {
        (**self).header_hash(header)
    }
}

/// Bitcoin's double SHA-256 header hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256dHasher;

impl HeaderHasher for Sha256dHasher {
    fn header_hash(&self, header: &BlockHeader) -> BlockHash {
        header.block_hash()
    }
}
