//! Fixed seed peers.
//!
//! A node ships a compact table of peers it can connect to when DNS seeding
//! yields nothing. The table is turned into peer records once, at profile
//! construction. Each record gets a "last seen" time between one and two
//! weeks in the past, so addresses learned from the network after the first
//! connection are fresher and replace the seeds.

use std::net::{Ipv6Addr, SocketAddr, SocketAddrV6};

use bitcoin::p2p::Address;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::p2p::ServiceFlags;

/// Seconds in one week.
pub const ONE_WEEK: i64 = 7 * 24 * 60 * 60;

/// Fixed seed peers of the main network.
///
/// Empty until seed operators publish stable addresses; DNS seeding covers
/// bootstrap in the meantime.
pub const MAIN_SEEDS: &[SeedSpec6] = &[];

/// Source of the current Unix time, in seconds.
pub trait Clock {
    /// Returns the current Unix time in seconds.
    fn now(&self) -> i64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> i64 {
        (**self).now()
    }
}

/// Wall clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// One entry of a compiled-in seed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeedSpec6 {
    /// IPv6 address in network byte order; IPv4 peers use the
    /// `::ffff:a.b.c.d` mapping.
    pub addr: [u8; 16],
    /// TCP port.
    pub port: u16,
}

impl SeedSpec6 {
    /// Creates a table entry.
    pub const fn new(addr: [u8; 16], port: u16) -> Self {
        Self { addr, port }
    }

    /// Creates a table entry for an IPv4 peer.
    pub const fn from_ipv4(octets: [u8; 4], port: u16) -> Self {
        let [a, b, c, d] = octets;
        Self {
            addr: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff, 0xff, a, b, c, d],
            port,
        }
    }
}

/// A bootstrap peer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedAddress {
    addr: SocketAddrV6,
    services: ServiceFlags,
    last_seen: i64,
}

impl SeedAddress {
    /// The peer address as stored in the seed table.
    pub fn addr(&self) -> SocketAddrV6 {
        self.addr
    }

    /// The peer address with IPv4-mapped addresses unmapped.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.addr.ip().to_canonical(), self.addr.port())
    }

    /// Services the peer is assumed to offer.
    pub fn services(&self) -> ServiceFlags {
        self.services
    }

    /// Unix time the peer is considered to have been last seen.
    pub fn last_seen(&self) -> i64 {
        self.last_seen
    }

    /// Converts the record into the wire address type.
    pub fn to_p2p_address(&self) -> Address {
        Address::new(&SocketAddr::V6(self.addr), self.services)
    }
}

/// Converts a compiled-in seed table into peer records.
///
/// Every record is stamped `now - ONE_WEEK - r` with `r` drawn uniformly
/// from `[0, ONE_WEEK)`, so the result lies in `(now - 2 * ONE_WEEK,
/// now - ONE_WEEK]`.
pub fn convert_seed6<C, R>(seeds: &[SeedSpec6], clock: &C, rng: &mut R) -> Vec<SeedAddress>
where
    C: Clock + ?Sized,
    R: Rng + ?Sized,
{
    let now = clock.now();
    let converted: Vec<SeedAddress> = seeds
        .iter()
        .map(|seed| {
            let jitter = rng.random_range(0..ONE_WEEK);
            SeedAddress {
                addr: SocketAddrV6::new(Ipv6Addr::from(seed.addr), seed.port, 0, 0),
                services: ServiceFlags::NETWORK,
                last_seen: now.saturating_sub(ONE_WEEK).saturating_sub(jitter),
            }
        })
        .collect();

    debug!(count = converted.len(), "converted fixed seeds");
    converted
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::test_utils::FixedClock;

    const NOW: i64 = 1_700_000_000;

    fn table() -> Vec<SeedSpec6> {
        vec![
            SeedSpec6::from_ipv4([203, 0, 113, 7], 45130),
            SeedSpec6::from_ipv4([198, 51, 100, 23], 45130),
            SeedSpec6::new(
                [0x20, 0x01, 0x0d, 0xb8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01],
                45131,
            ),
        ]
    }

    #[test]
    fn test_last_seen_within_one_to_two_weeks() {
        let mut rng = StdRng::seed_from_u64(7);
        let seeds: Vec<SeedSpec6> = (0..200u8)
            .map(|i| SeedSpec6::from_ipv4([10, 0, 0, i], 45130))
            .collect();

        let converted = convert_seed6(&seeds, &FixedClock(NOW), &mut rng);
        assert_eq!(converted.len(), seeds.len());
        for addr in &converted {
            assert!(addr.last_seen() <= NOW - ONE_WEEK);
            assert!(addr.last_seen() >= NOW - 2 * ONE_WEEK);
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let first = convert_seed6(&table(), &FixedClock(NOW), &mut StdRng::seed_from_u64(42));
        let second = convert_seed6(&table(), &FixedClock(NOW), &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);

        let other = convert_seed6(&table(), &FixedClock(NOW), &mut StdRng::seed_from_u64(43));
        assert_ne!(first, other);
    }

    #[test]
    fn test_decodes_addresses_and_ports() {
        let converted = convert_seed6(&table(), &FixedClock(NOW), &mut StdRng::seed_from_u64(1));

        assert_eq!(
            converted[0].socket_addr(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 7)), 45130)
        );
        assert_eq!(
            converted[1].socket_addr(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 23)), 45130)
        );
        assert_eq!(
            converted[2].socket_addr(),
            "[2001:db8::1]:45131".parse::<SocketAddr>().unwrap()
        );
        assert!(converted.iter().all(|a| a.services() == ServiceFlags::NETWORK));
    }

    #[test]
    fn test_to_p2p_address() {
        let converted = convert_seed6(&table(), &FixedClock(NOW), &mut StdRng::seed_from_u64(1));
        let wire = converted[2].to_p2p_address();
        assert_eq!(wire.port, 45131);
        assert_eq!(wire.services, ServiceFlags::NETWORK);
        assert_eq!(wire.address, [0x2001, 0x0db8, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_empty_table() {
        let converted = convert_seed6(MAIN_SEEDS, &FixedClock(NOW), &mut StdRng::seed_from_u64(1));
        assert!(converted.is_empty());
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2018-02-12, the genesis coinbase time
        assert!(SystemClock.now() > 1_518_443_368);
    }
}
