//! The registry of network profiles and the startup selection policy.
//!
//! A node builds a [`ParamsRegistry`] once at startup, selects a network
//! from its command line flags and then calls [`ParamsRegistry::freeze`].
//! The resulting [`ActiveParams`] handle has no selection API and can be
//! cloned into every subsystem that reads the parameters.

use std::{ops::Deref, sync::Arc};

use clap::Args;
use thiserror::Error;
use tracing::info;

use crate::{
    blockdata::genesis::GenesisError, chainparams::ChainParams, hashes::HeaderHasher,
    network::Network,
};

/// Errors that can occur when selecting a network from startup flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// Both the test network and regtest were requested.
    #[error("invalid combination of --testnet and --regtest")]
    ConflictingNetworks,
}

/// Network selection flags, meant to be flattened into a node's own
/// arguments.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartupFlags {
    /// Use the test network
    #[arg(long)]
    pub testnet: bool,

    /// Use the regression test network
    #[arg(long)]
    pub regtest: bool,
}

impl StartupFlags {
    /// Resolves the flags to a network.
    ///
    /// Regtest wins over the default, testnet over the default, and asking
    /// for both is an error.
    pub fn network(&self) -> Result<Network, SelectionError> {
        match (self.testnet, self.regtest) {
            (true, true) => Err(SelectionError::ConflictingNetworks),
            (_, true) => Ok(Network::Regtest),
            (true, false) => Ok(Network::Testnet),
            (false, false) => Ok(Network::Mainnet),
        }
    }
}

/// Holds the three network profiles and the selected one.
#[derive(Debug, Clone)]
pub struct ParamsRegistry {
    main: ChainParams,
    test: ChainParams,
    regtest: ChainParams,
    active: Network,
}

impl ParamsRegistry {
    /// Builds and verifies every profile, in main, test, regtest order.
    ///
    /// The main network starts out active. A genesis mismatch on any network
    /// fails the whole registry.
    pub fn new(hasher: &impl HeaderHasher) -> Result<Self, GenesisError> {
        let main = ChainParams::main(hasher)?;
        Self::from_main(main, hasher)
    }

    /// Builds the test and regtest profiles on top of an existing main
    /// profile.
    pub fn from_main(main: ChainParams, hasher: &impl HeaderHasher) -> Result<Self, GenesisError> {
        let test = ChainParams::testnet(&main, hasher)?;
        let regtest = ChainParams::regtest(&test, hasher)?;

        Ok(Self {
            main,
            test,
            regtest,
            active: Network::Mainnet,
        })
    }

    /// Makes `network` the active profile.
    pub fn select(&mut self, network: Network) {
        self.active = network;
        info!(%network, "selected network parameters");
    }

    /// Selects the network requested by the startup flags.
    ///
    /// On conflicting flags the active profile is left unchanged.
    pub fn select_from_flags(&mut self, flags: StartupFlags) -> Result<Network, SelectionError> {
        let network = flags.network()?;
        self.select(network);
        Ok(network)
    }

    /// The active network.
    pub fn active_network(&self) -> Network {
        self.active
    }

    /// The active profile.
    pub fn active(&self) -> &ChainParams {
        self.get(self.active)
    }

    /// The profile of `network`.
    pub fn get(&self, network: Network) -> &ChainParams {
        match network {
            Network::Mainnet => &self.main,
            Network::Testnet => &self.test,
            Network::Regtest => &self.regtest,
        }
    }

    /// Ends selection and returns a shareable handle to the active profile.
    pub fn freeze(self) -> ActiveParams {
        let params = match self.active {
            Network::Mainnet => self.main,
            Network::Testnet => self.test,
            Network::Regtest => self.regtest,
        };
        ActiveParams(Arc::new(params))
    }
}

/// Read-only handle to the selected profile.
#[derive(Debug, Clone)]
pub struct ActiveParams(Arc<ChainParams>);

impl Deref for ActiveParams {
    type Target = ChainParams;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<ChainParams> for ActiveParams {
    fn as_ref(&self) -> &ChainParams {
        &self.0
    }
}
