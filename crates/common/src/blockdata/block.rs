pub use bitcoin::block::{Header, Version};
use bitcoin::{
    VarInt,
    consensus::Encodable,
    io::{Error as IoError, Write},
    merkle_tree,
};

use crate::{
    blockdata::transaction::Transaction,
    hashes::{BlockHash, Hash, HeaderHasher, TxMerkleNode},
};

/// Represents a block in the blockchain.
///
/// A `Block` contains:
/// - The 80-byte header, encoded exactly like Bitcoin's
/// - The transactions contained within the block
/// - The block signature of a proof-of-stake block; empty for proof-of-work
///   blocks, including the genesis block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// The block header
    pub header: Header,
    /// List of transactions contained in the block
    pub transactions: Vec<Transaction>,
    /// Signature by the staking key, if any
    pub signature: Vec<u8>,
}

impl Block {
    /// Creates a new unsigned block.
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
            signature: Vec::new(),
        }
    }

    /// Gets a reference to the block header
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Gets a reference to the transactions
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Gets the number of transactions in the block
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Computes the merkle root of the block's transactions.
    ///
    /// Returns `None` for a block without transactions.
    pub fn compute_merkle_root(&self) -> Option<TxMerkleNode> {
        merkle_root(&self.transactions)
    }

    /// Checks the header's merkle root against the transactions.
    pub fn check_merkle_root(&self) -> bool {
        self.compute_merkle_root() == Some(self.header.merkle_root)
    }

    /// Hashes the header with the chain's header hash function.
    pub fn block_hash(&self, hasher: &impl HeaderHasher) -> BlockHash {
        hasher.header_hash(&self.header)
    }
}

/// Computes the merkle root over the transaction ids.
///
/// With a single transaction the root is that transaction's id.
pub fn merkle_root(transactions: &[Transaction]) -> Option<TxMerkleNode> {
    let hashes = transactions
        .iter()
        .map(|tx| TxMerkleNode::from_raw_hash(tx.txid().to_raw_hash()));
    merkle_tree::calculate_root(hashes)
}

impl Encodable for Block {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        let mut len = self.header.consensus_encode(writer)?;

        len = len.saturating_add(VarInt::from(self.transactions.len()).consensus_encode(writer)?);
        for tx in &self.transactions {
            len = len.saturating_add(tx.consensus_encode(writer)?);
        }

        len = len.saturating_add(self.signature.consensus_encode(writer)?);

        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::{Amount, CompactTarget, OutPoint, ScriptBuf, Sequence, TxIn, TxOut, Witness};

    use super::*;
    use crate::hashes::Sha256dHasher;

    fn tx(time: u32) -> Transaction {
        Transaction {
            version: 1,
            time,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::ZERO,
                script_pubkey: ScriptBuf::new(),
            }],
            lock_time: 0,
        }
    }

    fn header(merkle_root: TxMerkleNode) -> Header {
        Header {
            version: Version::ONE,
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root,
            time: 1518443368,
            bits: CompactTarget::from_consensus(0x1e3fffff),
            nonce: 0,
        }
    }

    #[test]
    fn test_single_transaction_root_is_txid() {
        let transactions = vec![tx(1)];
        let root = merkle_root(&transactions).unwrap();
        assert_eq!(root.to_byte_array(), transactions[0].txid().to_byte_array());
    }

    #[test]
    fn test_empty_block_has_no_root() {
        assert_eq!(merkle_root(&[]), None);
        let block = Block::new(header(TxMerkleNode::all_zeros()), Vec::new());
        assert!(!block.check_merkle_root());
    }

    #[test]
    fn test_two_transaction_root_differs_from_either_txid() {
        let transactions = vec![tx(1), tx(2)];
        let root = merkle_root(&transactions).unwrap();
        assert_ne!(root.to_byte_array(), transactions[0].txid().to_byte_array());
        assert_ne!(root.to_byte_array(), transactions[1].txid().to_byte_array());
    }

    #[test]
    fn test_check_merkle_root() {
        let transactions = vec![tx(1)];
        let root = merkle_root(&transactions).unwrap();
        let block = Block::new(header(root), transactions);
        assert!(block.check_merkle_root());

        let tampered = Block::new(header(root), vec![tx(2)]);
        assert!(!tampered.check_merkle_root());
    }

    #[test]
    fn test_block_hash_uses_hasher() {
        let block = Block::new(header(TxMerkleNode::all_zeros()), vec![tx(1)]);
        assert_eq!(block.block_hash(&Sha256dHasher), block.header.block_hash());
    }

    #[test]
    fn test_block_encoding_layout() {
        let block = Block::new(header(TxMerkleNode::all_zeros()), vec![tx(1)]);
        let encoded = bitcoin::consensus::encode::serialize(&block);
        let tx_len = bitcoin::consensus::encode::serialize(&block.transactions[0]).len();
        // header + tx count + tx + empty signature
        assert_eq!(encoded.len(), 80 + 1 + tx_len + 1);
        assert_eq!(encoded.last(), Some(&0));
    }
}
