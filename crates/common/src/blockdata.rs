/// Blocks and merkle root computation.
pub mod block;
/// Genesis block construction and verification.
pub mod genesis;
/// Proof-of-stake transaction format.
pub mod transaction;
