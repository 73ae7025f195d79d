//! Per-network parameter profiles.
//!
//! The main network profile is built from literal constants. The test network
//! is a copy of main with [`ProfileOverrides::testnet`] applied, and regtest is
//! a copy of test with [`ProfileOverrides::regtest`] applied. Every profile
//! rebuilds and verifies its own genesis block while it is constructed.

use std::path::{Path, PathBuf};

use bitcoin::base58;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    blockdata::{
        block::Block,
        genesis::{GenesisBuilder, GenesisError, GenesisInfo},
    },
    hashes::{BlockHash, HeaderHasher},
    network::Network,
    p2p::Magic,
    pow::Target,
    seeds::{Clock, MAIN_SEEDS, SeedAddress, SeedSpec6, SystemClock, convert_seed6},
};

/// Uncompressed public key that signs main network alerts.
const MAIN_ALERT_PUBKEY: [u8; 65] = [
    0x04, 0xc9, 0xbc, 0xf0, 0xbc, 0x50, 0x16, 0xb8, 0xb7, 0x3f, 0x59, 0xd0, 0x5d, 0x23, 0x5a, 0xae,
    0x31, 0x99, 0x35, 0x6d, 0x0b, 0x1d, 0xcb, 0x1f, 0x11, 0x13, 0x4c, 0x16, 0xee, 0xc1, 0xf9, 0x1c,
    0xfb, 0x52, 0x89, 0xf7, 0x8f, 0xb7, 0x0e, 0x5a, 0x5d, 0xbc, 0x86, 0x28, 0x47, 0x97, 0xa7, 0x97,
    0x5f, 0xac, 0x45, 0x40, 0xa7, 0x36, 0x47, 0x86, 0x4b, 0x3a, 0x9b, 0xa1, 0x94, 0xef, 0x88, 0x99,
    0x75,
];

/// Uncompressed public key that signs test network alerts.
const TEST_ALERT_PUBKEY: [u8; 65] = [
    0x04, 0xac, 0x24, 0xab, 0x00, 0x3c, 0x82, 0x8c, 0xdd, 0x9c, 0xf4, 0xdb, 0x2e, 0xbb, 0xde, 0x8e,
    0x1c, 0xec, 0xb3, 0xbb, 0xfa, 0x8b, 0x31, 0x27, 0xfc, 0xb9, 0xdd, 0x9b, 0x84, 0xd4, 0x41, 0x12,
    0x08, 0x08, 0x27, 0xed, 0x7c, 0x49, 0xa6, 0x48, 0xaf, 0x9f, 0xe7, 0x88, 0xff, 0x42, 0xe3, 0x16,
    0xae, 0xe6, 0x65, 0x87, 0x9c, 0x55, 0x3f, 0x09, 0x9e, 0x55, 0x29, 0x9d, 0x6b, 0x54, 0xed, 0xd7,
    0xe0,
];

/// The kinds of base58check payloads that carry a network prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Base58Type {
    /// Pay-to-pubkey-hash address.
    PubkeyAddress,
    /// Pay-to-script-hash address.
    ScriptAddress,
    /// WIF private key.
    SecretKey,
    /// Stealth address.
    StealthAddress,
    /// BIP32 extended public key.
    ExtPublicKey,
    /// BIP32 extended private key.
    ExtSecretKey,
}

/// Version prefixes of the base58check encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Base58Prefixes {
    /// Prefix of pay-to-pubkey-hash addresses.
    pub pubkey_address: [u8; 1],
    /// Prefix of pay-to-script-hash addresses.
    pub script_address: [u8; 1],
    /// Prefix of WIF private keys.
    pub secret_key: [u8; 1],
    /// Prefix of stealth addresses.
    pub stealth_address: [u8; 1],
    /// Prefix of extended public keys.
    pub ext_public_key: [u8; 4],
    /// Prefix of extended private keys.
    pub ext_secret_key: [u8; 4],
}

impl Base58Prefixes {
    /// Main network prefixes.
    pub const MAINNET: Self = Self {
        pubkey_address: [23],
        script_address: [57],
        secret_key: [55],
        stealth_address: [59],
        ext_public_key: [0x04, 0x88, 0xb2, 0x1e],
        ext_secret_key: [0x04, 0x88, 0xad, 0xe4],
    };

    /// Test network prefixes, shared by regtest.
    pub const TESTNET: Self = Self {
        pubkey_address: [83],
        script_address: [39],
        secret_key: [63],
        stealth_address: [37],
        ext_public_key: [0x04, 0x35, 0x87, 0xcf],
        ext_secret_key: [0x04, 0x35, 0x83, 0x94],
    };

    /// Returns the prefix bytes for `kind`.
    pub fn get(&self, kind: Base58Type) -> &[u8] {
        match kind {
            Base58Type::PubkeyAddress => &self.pubkey_address,
            Base58Type::ScriptAddress => &self.script_address,
            Base58Type::SecretKey => &self.secret_key,
            Base58Type::StealthAddress => &self.stealth_address,
            Base58Type::ExtPublicKey => &self.ext_public_key,
            Base58Type::ExtSecretKey => &self.ext_secret_key,
        }
    }
}

/// Errors that can occur when decoding a base58check string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// The string is not valid base58check.
    #[error("invalid base58check encoding: {0}")]
    Base58(#[from] base58::Error),

    /// The version prefix belongs to another kind or another network.
    #[error("{network} does not use this prefix for {kind:?}")]
    PrefixMismatch {
        /// Network whose prefix table was applied.
        network: Network,
        /// Kind the caller expected.
        kind: Base58Type,
    },
}

/// A DNS seed: a display name and the host to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DnsSeed {
    /// Name shown to the operator.
    pub name: String,
    /// Host queried for peer addresses.
    pub host: String,
}

impl DnsSeed {
    /// Creates a seed entry.
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
        }
    }
}

/// Constants read by the masternode and budget subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MasternodeParams {
    /// Maximum number of transactions in a mixing pool.
    pub pool_max_transactions: u32,
    /// Placeholder address used by the mixing pool.
    pub pool_dummy_address: String,
    /// Recipient of the budget payments.
    pub budget_address: String,
    /// Share of the block reward paid to the budget, in percent.
    pub budget_percentage: u32,
}

impl MasternodeParams {
    /// Main network masternode constants, inherited by the other networks.
    pub fn mainnet() -> Self {
        Self {
            pool_max_transactions: 3,
            pool_dummy_address: "AQrdxgSckxugGue85kbKsikqvyotAXp211".to_string(),
            budget_address: "ATVAXA6LU2ewsXrsW5aXhoF9NKFT4x2kun".to_string(),
            budget_percentage: 1,
        }
    }
}

/// Fields a derived profile replaces in its base profile.
///
/// `None` keeps the base value. Seed lists are always cleared on derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileOverrides {
    /// Network of the derived profile.
    pub network: Network,
    /// Wire magic.
    pub message_start: Magic,
    /// P2P listening port.
    pub default_port: u16,
    /// RPC listening port.
    pub rpc_port: Option<u16>,
    /// Proof-of-work ceiling; also sets the genesis bits.
    pub pow_limit: Target,
    /// Proof-of-stake ceiling.
    pub pos_limit: Option<Target>,
    /// Alert signing key.
    pub alert_pubkey: Option<[u8; 65]>,
    /// Data subdirectory.
    pub data_dir: String,
    /// Base58check prefixes.
    pub base58_prefixes: Option<Base58Prefixes>,
    /// Whether the RPC server refuses to start without a password.
    pub require_rpc_password: Option<bool>,
    /// Last proof-of-work block height.
    pub end_pow_block: Option<u32>,
    /// Genesis header fields and expected hashes.
    pub genesis: GenesisInfo,
}

impl ProfileOverrides {
    /// Turns the main network profile into the test network profile.
    pub fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            message_start: Magic::TESTNET,
            default_port: 25130,
            rpc_port: Some(25131),
            pow_limit: Target::from_leading_zero_bits(16),
            pos_limit: Some(Target::from_leading_zero_bits(16)),
            alert_pubkey: Some(TEST_ALERT_PUBKEY),
            data_dir: "testnet".to_string(),
            base58_prefixes: Some(Base58Prefixes::TESTNET),
            require_rpc_password: None,
            end_pow_block: Some(0x7fff_ffff),
            genesis: GenesisInfo::testnet(),
        }
    }

    /// Turns the test network profile into the regtest profile.
    pub fn regtest() -> Self {
        Self {
            network: Network::Regtest,
            message_start: Magic::REGTEST,
            default_port: 10300,
            rpc_port: None,
            pow_limit: Target::from_leading_zero_bits(1),
            pos_limit: None,
            alert_pubkey: None,
            data_dir: "regtest".to_string(),
            base58_prefixes: None,
            require_rpc_password: Some(false),
            end_pow_block: None,
            genesis: GenesisInfo::regtest(),
        }
    }
}

/// The parameters of one network.
///
/// A profile is immutable once built; every field is read through an
/// accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    network: Network,
    message_start: Magic,
    alert_pubkey: [u8; 65],
    default_port: u16,
    rpc_port: u16,
    pow_limit: Target,
    pos_limit: Target,
    base58_prefixes: Base58Prefixes,
    dns_seeds: Vec<DnsSeed>,
    fixed_seeds: Vec<SeedAddress>,
    data_dir: String,
    require_rpc_password: bool,
    genesis: Block,
    genesis_hash: BlockHash,
    masternode: MasternodeParams,
    end_pow_block: u32,
    start_pos_block: u32,
}

impl ChainParams {
    /// Builds the main network profile, stamping the fixed seeds with the
    /// system clock and the thread-local RNG.
    pub fn main(hasher: &impl HeaderHasher) -> Result<Self, GenesisError> {
        Self::main_with_seeds(hasher, MAIN_SEEDS, &SystemClock, &mut rand::rng())
    }

    /// Builds the main network profile from the given seed table.
    pub fn main_with_seeds<C, R>(
        hasher: &impl HeaderHasher,
        seeds: &[SeedSpec6],
        clock: &C,
        rng: &mut R,
    ) -> Result<Self, GenesisError>
    where
        C: Clock + ?Sized,
        R: Rng + ?Sized,
    {
        let network = Network::Mainnet;
        let pow_limit = Target::from_leading_zero_bits(18);
        let (genesis, genesis_hash) =
            build_genesis(network, &GenesisInfo::mainnet(), pow_limit, hasher)?;

        Ok(Self {
            network,
            message_start: Magic::MAINNET,
            alert_pubkey: MAIN_ALERT_PUBKEY,
            default_port: 45130,
            rpc_port: 45131,
            pow_limit,
            pos_limit: Target::from_leading_zero_bits(18),
            base58_prefixes: Base58Prefixes::MAINNET,
            dns_seeds: vec![
                DnsSeed::new("seed1.arion.com", "seed1.arion.com"),
                DnsSeed::new("seed2.arion.com", "seed2.arion.com"),
            ],
            fixed_seeds: convert_seed6(seeds, clock, rng),
            data_dir: String::new(),
            require_rpc_password: true,
            genesis,
            genesis_hash,
            masternode: MasternodeParams::mainnet(),
            end_pow_block: 0x7fff_ffff,
            start_pos_block: 0,
        })
    }

    /// Builds the test network profile from the main network profile.
    pub fn testnet(main: &ChainParams, hasher: &impl HeaderHasher) -> Result<Self, GenesisError> {
        main.derive(ProfileOverrides::testnet(), hasher)
    }

    /// Builds the regtest profile from the test network profile.
    pub fn regtest(test: &ChainParams, hasher: &impl HeaderHasher) -> Result<Self, GenesisError> {
        test.derive(ProfileOverrides::regtest(), hasher)
    }

    /// Copies this profile, applies `overrides` and verifies the rebuilt
    /// genesis block.
    pub fn derive(
        &self,
        overrides: ProfileOverrides,
        hasher: &impl HeaderHasher,
    ) -> Result<Self, GenesisError> {
        let (genesis, genesis_hash) =
            build_genesis(overrides.network, &overrides.genesis, overrides.pow_limit, hasher)?;

        Ok(Self {
            network: overrides.network,
            message_start: overrides.message_start,
            alert_pubkey: overrides.alert_pubkey.unwrap_or(self.alert_pubkey),
            default_port: overrides.default_port,
            rpc_port: overrides.rpc_port.unwrap_or(self.rpc_port),
            pow_limit: overrides.pow_limit,
            pos_limit: overrides.pos_limit.unwrap_or(self.pos_limit),
            base58_prefixes: overrides.base58_prefixes.unwrap_or(self.base58_prefixes),
            dns_seeds: Vec::new(),
            fixed_seeds: Vec::new(),
            data_dir: overrides.data_dir,
            require_rpc_password: overrides
                .require_rpc_password
                .unwrap_or(self.require_rpc_password),
            genesis,
            genesis_hash,
            masternode: self.masternode.clone(),
            end_pow_block: overrides.end_pow_block.unwrap_or(self.end_pow_block),
            start_pos_block: self.start_pos_block,
        })
    }

    /// The network these parameters belong to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// Magic bytes framing every wire message.
    pub fn message_start(&self) -> Magic {
        self.message_start
    }

    /// Public key that signs alert messages.
    pub fn alert_pubkey(&self) -> &[u8] {
        &self.alert_pubkey
    }

    /// Default P2P port.
    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    /// Default RPC port.
    pub fn rpc_port(&self) -> u16 {
        self.rpc_port
    }

    /// Highest target a proof-of-work block may have.
    pub fn pow_limit(&self) -> Target {
        self.pow_limit
    }

    /// Highest target a proof-of-stake block may have.
    pub fn pos_limit(&self) -> Target {
        self.pos_limit
    }

    /// The full base58 prefix table.
    pub fn base58_prefixes(&self) -> &Base58Prefixes {
        &self.base58_prefixes
    }

    /// The base58 prefix for `kind`.
    pub fn base58_prefix(&self, kind: Base58Type) -> &[u8] {
        self.base58_prefixes.get(kind)
    }

    /// DNS seeds, in query order.
    pub fn dns_seeds(&self) -> &[DnsSeed] {
        &self.dns_seeds
    }

    /// Fixed seed peers.
    pub fn fixed_seeds(&self) -> &[SeedAddress] {
        &self.fixed_seeds
    }

    /// Data subdirectory name; empty for the main network.
    pub fn data_dir(&self) -> &str {
        &self.data_dir
    }

    /// Resolves the directory holding this network's state under `base`.
    pub fn data_dir_path(&self, base: &Path) -> PathBuf {
        if self.data_dir.is_empty() {
            base.to_path_buf()
        } else {
            base.join(&self.data_dir)
        }
    }

    /// Whether the RPC server refuses to start without a password.
    pub fn require_rpc_password(&self) -> bool {
        self.require_rpc_password
    }

    /// The verified genesis block.
    pub fn genesis_block(&self) -> &Block {
        &self.genesis
    }

    /// Hash of the genesis block.
    pub fn genesis_hash(&self) -> BlockHash {
        self.genesis_hash
    }

    /// Masternode and budget constants.
    pub fn masternode(&self) -> &MasternodeParams {
        &self.masternode
    }

    /// Height of the last proof-of-work block.
    pub fn end_pow_block(&self) -> u32 {
        self.end_pow_block
    }

    /// Height of the first proof-of-stake block.
    pub fn start_pos_block(&self) -> u32 {
        self.start_pos_block
    }

    /// Encodes `payload` as base58check behind this network's prefix for
    /// `kind`.
    pub fn encode_base58(&self, kind: Base58Type, payload: &[u8]) -> String {
        let mut data = self.base58_prefix(kind).to_vec();
        data.extend_from_slice(payload);
        base58::encode_check(&data)
    }

    /// Decodes a base58check string and strips this network's prefix for
    /// `kind`.
    pub fn decode_base58(&self, kind: Base58Type, s: &str) -> Result<Vec<u8>, AddressError> {
        let data = base58::decode_check(s)?;
        data.strip_prefix(self.base58_prefix(kind))
            .map(<[u8]>::to_vec)
            .ok_or(AddressError::PrefixMismatch {
                network: self.network,
                kind,
            })
    }
}

fn build_genesis(
    network: Network,
    info: &GenesisInfo,
    pow_limit: Target,
    hasher: &impl HeaderHasher,
) -> Result<(Block, BlockHash), GenesisError> {
    let bits = pow_limit.to_compact().ok_or(GenesisError::InvalidBits(network))?;
    let block = info.build(&GenesisBuilder::default(), bits)?;
    let hash = info.verify(network, &block, hasher)?;
    info!(%network, %hash, %bits, "verified genesis block");
    Ok((block, hash))
}
