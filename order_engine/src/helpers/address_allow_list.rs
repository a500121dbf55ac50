//! Source-address checks for inbound payment notifications.
//!
//! The payment provider does not sign its notifications. The only thing that distinguishes a genuine notification
//! from a forged one is the address it came from, so the reconciler refuses anything that does not originate from
//! one of the provider's published addresses or networks.
use std::{
    fmt::Display,
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    str::FromStr,
};

use thiserror::Error;

/// The addresses and networks that the provider sends notifications from.
pub const YOOKASSA_NOTIFICATION_SOURCES: [&str; 7] = [
    "185.71.76.0/27",
    "185.71.77.0/27",
    "77.75.153.0/25",
    "77.75.156.11",
    "77.75.156.35",
    "77.75.154.128/25",
    "2a02:5180::/32",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid address or network '{0}'")]
pub struct AddressParseError(pub String);

/// A single address, or a CIDR network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowedAddress {
    Single(IpAddr),
    Network { base: IpAddr, prefix_len: u8 },
}

impl AllowedAddress {
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self, ip.to_canonical()) {
            (Self::Single(allowed), ip) => allowed.to_canonical() == ip,
            (Self::Network { base: IpAddr::V4(base), prefix_len }, IpAddr::V4(ip)) => {
                let mask = v4_mask(*prefix_len);
                u32::from(*base) & mask == u32::from(ip) & mask
            },
            (Self::Network { base: IpAddr::V6(base), prefix_len }, IpAddr::V6(ip)) => {
                let mask = v6_mask(*prefix_len);
                u128::from(*base) & mask == u128::from(ip) & mask
            },
            _ => false,
        }
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    match prefix_len {
        0 => 0,
        n => u32::MAX << (32 - u32::from(n.min(32))),
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    match prefix_len {
        0 => 0,
        n => u128::MAX << (128 - u32::from(n.min(128))),
    }
}

impl FromStr for AllowedAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || AddressParseError(s.to_string());
        match s.split_once('/') {
            None => s.parse::<IpAddr>().map(Self::Single).map_err(|_| err()),
            Some((base, prefix)) => {
                let base = base.parse::<IpAddr>().map_err(|_| err())?;
                let prefix_len = prefix.parse::<u8>().map_err(|_| err())?;
                let max = if base.is_ipv4() { 32 } else { 128 };
                if prefix_len > max {
                    return Err(err());
                }
                Ok(Self::Network { base, prefix_len })
            },
        }
    }
}

impl Display for AllowedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{ip}"),
            Self::Network { base, prefix_len } => write!(f, "{base}/{prefix_len}"),
        }
    }
}

/// A list of addresses and networks. An address is allowed if any entry contains it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressAllowList {
    entries: Vec<AllowedAddress>,
}

impl AddressAllowList {
    pub fn new(entries: Vec<AllowedAddress>) -> Self {
        Self { entries }
    }

    /// The provider's published notification sources.
    pub fn yookassa_default() -> Self {
        let entries = YOOKASSA_NOTIFICATION_SOURCES.iter().filter_map(|s| s.parse().ok()).collect();
        Self { entries }
    }

    /// Parses a comma-separated list such as `"10.0.0.0/8, 192.168.1.7"`. Blank entries are skipped.
    pub fn parse_list(list: &str) -> Result<Self, AddressParseError> {
        let entries = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(AllowedAddress::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.entries.iter().any(|e| e.contains(ip))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AllowedAddress] {
        &self.entries
    }

    pub fn with_address(mut self, ip: IpAddr) -> Self {
        self.entries.push(AllowedAddress::Single(ip));
        self
    }

    /// An allow-list that only admits the loopback addresses. Useful for local testing against a provider sandbox
    /// tunnelled through localhost.
    pub fn loopback() -> Self {
        Self::default().with_address(IpAddr::V4(Ipv4Addr::LOCALHOST)).with_address(IpAddr::V6(Ipv6Addr::LOCALHOST))
    }
}

impl Display for AddressAllowList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let list = self.entries.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", ");
        write!(f, "{list}")
    }
}
