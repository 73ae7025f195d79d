pub use bitcoin::p2p::ServiceFlags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::Network;

/// Network magic bytes to identify the network a wire message was intended
/// for.
///
/// Every message on the wire starts with these four bytes. They are rarely
/// used upper ASCII, not valid as UTF-8, and produce a large 4-byte integer at
/// any alignment, which keeps them unlikely to occur in normal data.
#[derive(Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize)]
pub struct Magic([u8; 4]);

impl Magic {
    /// Arion main network magic bytes.
    pub const MAINNET: Self = Self([0x22, 0xad, 0x88, 0xc1]);
    /// Arion test network magic bytes.
    pub const TESTNET: Self = Self([0x22, 0xde, 0xc6, 0xaa]);
    /// Arion regression test network magic bytes.
    pub const REGTEST: Self = Self([0x34, 0xd2, 0xee, 0x67]);

    /// Wraps raw magic bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    /// Returns the magic bytes as a 4-byte array.
    pub fn to_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl From<Network> for Magic {
    fn from(network: Network) -> Self {
        match network {
            Network::Mainnet => Magic::MAINNET,
            Network::Testnet => Magic::TESTNET,
            Network::Regtest => Magic::REGTEST,
        }
    }
}

impl From<Magic> for bitcoin::p2p::Magic {
    fn from(magic: Magic) -> Self {
        bitcoin::p2p::Magic::from_bytes(magic.0)
    }
}

impl std::fmt::Display for Magic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        hex::encode(self.0).fmt(f)
    }
}

/// Errors that can occur when working with magic bytes.
#[derive(Debug, PartialEq, Clone, Copy, Error)]
pub enum MagicError {
    /// The magic bytes don't correspond to any known network.
    #[error("unknown network magic: {0}")]
    UnknownMagic(Magic),
}

impl TryFrom<Magic> for Network {
    type Error = MagicError;

    fn try_from(magic: Magic) -> Result<Self, Self::Error> {
        match magic {
            Magic::MAINNET => Ok(Network::Mainnet),
            Magic::TESTNET => Ok(Network::Testnet),
            Magic::REGTEST => Ok(Network::Regtest),
            _ => Err(MagicError::UnknownMagic(magic)),
        }
    }
}
