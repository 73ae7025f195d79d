//! Transactions in the proof-of-stake serialization format.
//!
//! Arion transactions carry a creation time right after the version field.
//! Inputs and outputs reuse Bitcoin's types, which encode identically.

use bitcoin::{
    TxIn, TxOut,
    consensus::{Encodable, encode},
    io::{Error as IoError, Write},
};

use crate::hashes::{Hash, Txid};

/// A transaction with a timestamp field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Format version.
    pub version: i32,
    /// Creation time, seconds since the Unix epoch.
    pub time: u32,
    /// Inputs.
    pub input: Vec<TxIn>,
    /// Outputs.
    pub output: Vec<TxOut>,
    /// Block height or time before which the transaction is not final.
    pub lock_time: u32,
}

impl Transaction {
    /// Returns `true` if the single input spends the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        matches!(self.input.as_slice(), [input] if input.previous_output.is_null())
    }

    /// Double SHA-256 of the consensus encoding.
    pub fn txid(&self) -> Txid {
        Txid::hash(&encode::serialize(self))
    }
}

impl Encodable for Transaction {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, IoError> {
        let mut len = self.version.consensus_encode(writer)?;
        len = len.saturating_add(self.time.consensus_encode(writer)?);
        len = len.saturating_add(self.input.consensus_encode(writer)?);
        len = len.saturating_add(self.output.consensus_encode(writer)?);
        len = len.saturating_add(self.lock_time.consensus_encode(writer)?);
        Ok(len)
    }
}
