//! Network parameters for the Arion node.
//!
//! This library defines the constants that tell the Arion main, test and
//! regression test networks apart, rebuilds and verifies each network's
//! genesis block at startup, and selects the active network from the node's
//! startup flags.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Block data structures and the genesis block.
pub mod blockdata;
/// Per-network parameter profiles.
pub mod chainparams;
/// Hash types and the header hash seam.
pub mod hashes;
/// Network types and constants.
pub mod network;
/// Peer-to-peer protocol constants.
pub mod p2p;
/// Proof of Work related functionality.
pub mod pow;
/// Profile registry and startup selection.
pub mod registry;
/// Fixed seed bootstrap.
pub mod seeds;

#[cfg(test)]
pub(crate) mod test_utils;

pub use chainparams::ChainParams;
pub use network::Network;
pub use registry::{ActiveParams, ParamsRegistry, SelectionError, StartupFlags};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
