//! Genesis block construction and verification for the Arion networks.
//!
//! Each network's genesis block is rebuilt from literal constants on every
//! start and checked against the hash and merkle root recorded here. The
//! nonces were found offline once; a mismatch means the compiled-in
//! constants are inconsistent and the node must not start.

use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, TxIn, TxOut, Witness,
    script::{Builder, PushBytesBuf, PushBytesError},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::{
    blockdata::{
        block::{Block, Header, Version, merkle_root},
        transaction::Transaction,
    },
    hashes::{BlockHash, Hash, HeaderHasher, TxMerkleNode},
    network::Network,
    pow::CompactTarget,
};

/// Headline buried in the genesis coinbase.
pub const GENESIS_MESSAGE: &str =
    "09 Feb 2018 - Russia's Largest Bank Caught Employees Mining For Crypto";

/// Creation time of the genesis coinbase transaction, shared by all networks.
pub const GENESIS_TX_TIME: u32 = 1518443368;

/// Extra-nonce pushed after the height marker in the coinbase script.
const GENESIS_EXTRA_NONCE: i64 = 42;

/// Errors raised while building or verifying a genesis block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenesisError {
    /// The header hash differs from the recorded genesis hash.
    #[error("{network} genesis hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        /// Network whose genesis failed to verify.
        network: Network,
        /// Recorded hash.
        expected: BlockHash,
        /// Hash of the rebuilt header.
        computed: BlockHash,
    },

    /// The merkle root differs from the recorded genesis merkle root.
    #[error("{network} genesis merkle root mismatch: expected {expected}, computed {computed}")]
    MerkleRootMismatch {
        /// Network whose genesis failed to verify.
        network: Network,
        /// Recorded merkle root.
        expected: TxMerkleNode,
        /// Merkle root of the rebuilt transactions.
        computed: TxMerkleNode,
    },

    /// The block carries no transactions, so it has no merkle root.
    #[error("{0} genesis block has no transactions")]
    NoTransactions(Network),

    /// The embedded message cannot be pushed onto a script.
    #[error("genesis message does not fit a script push: {0}")]
    Message(#[from] PushBytesError),

    /// The difficulty ceiling has no compact encoding.
    #[error("{0} difficulty ceiling has no compact encoding")]
    InvalidBits(Network),
}

/// Builds the single-coinbase genesis block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenesisBuilder {
    message: String,
    tx_version: i32,
    tx_time: u32,
}

impl Default for GenesisBuilder {
    fn default() -> Self {
        Self::new(GENESIS_MESSAGE)
    }
}

impl GenesisBuilder {
    /// Creates a builder embedding `message` in the coinbase.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tx_version: 1,
            tx_time: GENESIS_TX_TIME,
        }
    }

    /// Sets the creation time of the coinbase transaction.
    pub fn with_tx_time(mut self, tx_time: u32) -> Self {
        self.tx_time = tx_time;
        self
    }

    /// Builds the coinbase transaction.
    ///
    /// The only input spends the null outpoint with the script
    /// `OP_0 <42> <message>`; the only output has zero value and an empty
    /// script, which marks it unspendable.
    pub fn coinbase(&self) -> Result<Transaction, GenesisError> {
        let message = PushBytesBuf::try_from(self.message.as_bytes().to_vec())?;
        let script_sig = Builder::new()
            .push_int(0)
            .push_int(GENESIS_EXTRA_NONCE)
            .push_slice(message)
            .into_script();

        Ok(Transaction {
            version: self.tx_version,
            time: self.tx_time,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig,
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: vec![TxOut {
                value: Amount::ZERO,
                script_pubkey: ScriptBuf::new(),
            }],
            lock_time: 0,
        })
    }

    /// Assembles the genesis block for the given header fields.
    pub fn build(
        &self,
        version: i32,
        time: u32,
        bits: CompactTarget,
        nonce: u32,
    ) -> Result<Block, GenesisError> {
        let transactions = vec![self.coinbase()?];
        // A single transaction always yields a root.
        let merkle_root = merkle_root(&transactions).unwrap_or_else(TxMerkleNode::all_zeros);

        let header = Header {
            version: Version::from_consensus(version),
            prev_blockhash: BlockHash::all_zeros(),
            merkle_root,
            time,
            bits: bits.into(),
            nonce,
        };

        Ok(Block::new(header, transactions))
    }
}

/// Genesis block information for different networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisInfo {
    /// The hash of the genesis block.
    pub hash: BlockHash,
    /// The merkle root of the genesis block.
    pub merkle_root: TxMerkleNode,
    /// The timestamp of the genesis block.
    pub timestamp: u32,
    /// The nonce of the genesis block.
    pub nonce: u32,
    /// The version of the genesis block.
    pub version: i32,
}

impl GenesisInfo {
    /// Returns the genesis block information for the specified network.
    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Mainnet => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    /// Returns the genesis block information for the mainnet network.
    pub fn mainnet() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0xab, 0x51, 0x62, 0x47, 0xe6, 0x75, 0x5c, 0x48, 0x3c, 0x9c, 0x3b, 0xd1, 0xdd, 0xa4,
                0x2f, 0x1f, 0xd5, 0x80, 0xb8, 0x31, 0xbd, 0xad, 0xc4, 0x27, 0x6e, 0x93, 0x08, 0x45,
                0xa9, 0x7d, 0x8b, 0x2a,
            ]),
            merkle_root: genesis_merkle_root(),
            timestamp: 1518443368,
            nonce: 23155991,
            version: 1,
        }
    }

    /// Returns the genesis block information for the testnet network.
    pub fn testnet() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x60, 0x7c, 0xd0, 0x9b, 0xc1, 0x62, 0x4f, 0x4f, 0xa7, 0x34, 0x3c, 0x46, 0xcb, 0x6a,
                0x5d, 0x6a, 0x72, 0x6b, 0x83, 0x0a, 0x78, 0xfe, 0x43, 0x1e, 0xa1, 0x31, 0x76, 0x39,
                0xf9, 0x79, 0xdc, 0x22,
            ]),
            merkle_root: genesis_merkle_root(),
            timestamp: 1518443398, // main + 30s
            nonce: 625692,
            version: 1,
        }
    }

    /// Returns the genesis block information for the regtest network.
    pub fn regtest() -> Self {
        Self {
            hash: BlockHash::from_byte_array([
                0x57, 0xf1, 0x06, 0xca, 0x0c, 0x9a, 0xb5, 0xca, 0x3e, 0x89, 0x8e, 0x6f, 0x47, 0xdf,
                0x2b, 0xf6, 0x45, 0x0c, 0xa8, 0x52, 0x74, 0x7d, 0x21, 0x14, 0xdf, 0xbc, 0x96, 0x79,
                0xee, 0xbd, 0xf5, 0x8c,
            ]),
            merkle_root: genesis_merkle_root(),
            timestamp: 1518443458, // main + 90s
            nonce: 293264,
            version: 1,
        }
    }

    /// Builds this network's genesis block with the given difficulty bits.
    pub fn build(&self, builder: &GenesisBuilder, bits: CompactTarget) -> Result<Block, GenesisError> {
        builder.build(self.version, self.timestamp, bits, self.nonce)
    }

    /// Checks `block` against the recorded merkle root and hash.
    ///
    /// Returns the verified block hash.
    pub fn verify(
        &self,
        network: Network,
        block: &Block,
        hasher: &impl HeaderHasher,
    ) -> Result<BlockHash, GenesisError> {
        let computed_root =
            block.compute_merkle_root().ok_or(GenesisError::NoTransactions(network))?;
        if computed_root != self.merkle_root || block.header.merkle_root != self.merkle_root {
            error!(%network, expected = %self.merkle_root, computed = %computed_root, "genesis merkle root mismatch");
            return Err(GenesisError::MerkleRootMismatch {
                network,
                expected: self.merkle_root,
                computed: computed_root,
            });
        }

        let computed = block.block_hash(hasher);
        if computed != self.hash {
            error!(%network, expected = %self.hash, %computed, "genesis hash mismatch");
            return Err(GenesisError::HashMismatch {
                network,
                expected: self.hash,
                computed,
            });
        }

        Ok(computed)
    }
}

/// Merkle root of the genesis coinbase; the coinbase is the same on every
/// network.
fn genesis_merkle_root() -> TxMerkleNode {
    TxMerkleNode::from_byte_array([
        0xc9, 0x01, 0x8a, 0x4f, 0xe8, 0x72, 0x7d, 0x1f, 0x96, 0x0d, 0xa3, 0xf9, 0xfe, 0x27, 0x57,
        0x02, 0x68, 0x89, 0xdf, 0xd2, 0x79, 0xf5, 0xfe, 0x67, 0x7d, 0x8f, 0xae, 0xbf, 0xba, 0xdb,
        0x9c, 0x64,
    ])
}

#[cfg(test)]
mod tests {
    use bitcoin::consensus::encode::serialize;

    use super::*;
    use crate::{hashes::Sha256dHasher, pow::Target, test_utils::RecordedHasher};

    const COINBASE_HEX: &str = "01000000689b815a010000000000000000000000000000000000000000000000\
                                000000000000000000ffffffff4a00012a463039204665622032303138202d20\
                                5275737369612773204c6172676573742042616e6b2043617567687420456d70\
                                6c6f79656573204d696e696e6720466f722043727970746fffffffff01000000\
                                00000000000000000000";

    fn bits(shift: u32) -> CompactTarget {
        Target::from_leading_zero_bits(shift).to_compact().unwrap()
    }

    #[test]
    fn test_coinbase_encoding() {
        let coinbase = GenesisBuilder::default().coinbase().unwrap();
        assert!(coinbase.is_coinbase());
        assert_eq!(hex::encode(serialize(&coinbase)), COINBASE_HEX);
    }

    #[test]
    fn test_coinbase_script_sig() {
        let coinbase = GenesisBuilder::default().coinbase().unwrap();
        let script = coinbase.input[0].script_sig.as_bytes();
        // OP_0, push 1 byte 0x2a, push 70 bytes of message
        assert_eq!(&script[..4], &[0x00, 0x01, 0x2a, 0x46]);
        assert_eq!(&script[4..], GENESIS_MESSAGE.as_bytes());
        assert!(coinbase.output[0].script_pubkey.is_empty());
        assert_eq!(coinbase.output[0].value, Amount::ZERO);
    }

    #[test]
    fn test_mainnet_merkle_root() {
        let info = GenesisInfo::mainnet();
        let block = info.build(&GenesisBuilder::default(), bits(18)).unwrap();
        assert_eq!(
            block.header.merkle_root.to_string(),
            "649cdbbabfae8f7d67fef579d2df8968025727fef9a30d961f7d72e84f8a01c9"
        );
        assert_eq!(block.header.merkle_root, info.merkle_root);
        assert!(block.check_merkle_root());
    }

    #[test]
    fn test_mainnet_header_bytes() {
        let block = GenesisInfo::mainnet().build(&GenesisBuilder::default(), bits(18)).unwrap();
        assert_eq!(
            hex::encode(serialize(&block.header)),
            "01000000000000000000000000000000000000000000000000000000000000000000000\
             0c9018a4fe8727d1f960da3f9fe2757026889dfd279f5fe677d8faebfbadb9c64689b815a\
             ffff3f1e17556101"
        );
    }

    #[test]
    fn test_testnet_and_regtest_header_bytes() {
        let builder = GenesisBuilder::default();
        let test = GenesisInfo::testnet().build(&builder, bits(16)).unwrap();
        let regtest = GenesisInfo::regtest().build(&builder, bits(1)).unwrap();

        assert_eq!(
            hex::encode(&serialize(&test.header)[68..]),
            "869b815affff001f1c8c0900"
        );
        assert_eq!(
            hex::encode(&serialize(&regtest.header)[68..]),
            "c29b815affff7f2090790400"
        );
        assert_eq!(test.header.merkle_root, regtest.header.merkle_root);
    }

    #[test]
    fn test_recorded_hashes_display() {
        assert_eq!(
            GenesisInfo::mainnet().hash.to_string(),
            "2a8b7da94508936e27c4adbd31b880d51f2fa4ddd13b9c3c485c75e6476251ab"
        );
        assert_eq!(
            GenesisInfo::testnet().hash.to_string(),
            "22dc79f9397631a11e43fe780a836b726a5d6acb463c34a74f4f62c19bd07c60"
        );
        assert_eq!(
            GenesisInfo::regtest().hash.to_string(),
            "8cf5bdee7996bcdf14217d7452a80c45f62bdf476f8e893ecab59a0cca06f157"
        );
    }

    #[test]
    fn test_verify_each_network() {
        let builder = GenesisBuilder::default();
        for (network, shift) in [(Network::Mainnet, 18), (Network::Testnet, 16), (Network::Regtest, 1)] {
            let info = GenesisInfo::for_network(network);
            let block = info.build(&builder, bits(shift)).unwrap();
            assert_eq!(info.verify(network, &block, &RecordedHasher).unwrap(), info.hash);
        }
    }

    #[test]
    fn test_verify_rejects_wrong_hash_function() {
        let info = GenesisInfo::mainnet();
        let block = info.build(&GenesisBuilder::default(), bits(18)).unwrap();

        let err = info.verify(Network::Mainnet, &block, &Sha256dHasher).unwrap_err();
        match err {
            GenesisError::HashMismatch {
                network,
                expected,
                computed,
            } => {
                assert_eq!(network, Network::Mainnet);
                assert_eq!(expected, info.hash);
                assert_eq!(
                    computed.to_string(),
                    "7648183d5c71f3cc828373d4744a791e2b9616a7e117ac42f00bfafb946a81d2"
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_verify_rejects_wrong_nonce() {
        let mut info = GenesisInfo::testnet();
        info.nonce += 1;
        let block = info.build(&GenesisBuilder::default(), bits(16)).unwrap();

        let err = info.verify(Network::Testnet, &block, &RecordedHasher).unwrap_err();
        assert!(matches!(err, GenesisError::HashMismatch { network: Network::Testnet, .. }));
        assert!(err.to_string().starts_with("test genesis hash mismatch"));
    }

    #[test]
    fn test_verify_rejects_altered_message() {
        let info = GenesisInfo::regtest();
        let builder = GenesisBuilder::new("09 Feb 2018 - something else");
        let block = info.build(&builder, bits(1)).unwrap();

        let err = info.verify(Network::Regtest, &block, &RecordedHasher).unwrap_err();
        assert!(matches!(err, GenesisError::MerkleRootMismatch { network: Network::Regtest, .. }));
    }

    #[test]
    fn test_verify_rejects_altered_tx_time() {
        let info = GenesisInfo::mainnet();
        let builder = GenesisBuilder::default().with_tx_time(GENESIS_TX_TIME + 1);
        let block = info.build(&builder, bits(18)).unwrap();

        assert!(matches!(
            info.verify(Network::Mainnet, &block, &RecordedHasher),
            Err(GenesisError::MerkleRootMismatch { .. })
        ));
    }

    #[test]
    fn test_verify_rejects_empty_block() {
        let info = GenesisInfo::mainnet();
        let mut block = info.build(&GenesisBuilder::default(), bits(18)).unwrap();
        block.transactions.clear();

        assert_eq!(
            info.verify(Network::Mainnet, &block, &RecordedHasher),
            Err(GenesisError::NoTransactions(Network::Mainnet))
        );
    }
}
