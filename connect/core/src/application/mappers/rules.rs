// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Format rules shared by the per-kind mappers.

use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

static FQDN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z][A-Za-z0-9-]{0,62}\.?$")
        .expect("FQDN pattern is valid")
});

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?$").expect("hostname pattern is valid")
});

static TEL_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^tel:\+?[0-9]+$").expect("tel URL pattern is valid"));

const MAX_FQDN_LENGTH: usize = 253;

/// Two or more dot-separated labels, e.g. `sip.local`
pub fn is_fqdn(value: &str) -> bool {
    value.len() <= MAX_FQDN_LENGTH && FQDN.is_match(value)
}

/// FQDN, single-label hostname, or IP address
pub fn is_host(value: &str) -> bool {
    is_fqdn(value) || HOSTNAME.is_match(value) || value.parse::<IpAddr>().is_ok()
}

/// `host` or `host:port`; IPv6 hosts with a port use brackets
pub fn is_host_port(value: &str) -> bool {
    if value.parse::<IpAddr>().is_ok() {
        return true;
    }

    if let Some(rest) = value.strip_prefix('[') {
        return match rest.split_once("]:") {
            Some((host, port)) => host.parse::<IpAddr>().is_ok() && is_port(port),
            None => false,
        };
    }

    match value.split_once(':') {
        Some((host, port)) => is_host(host) && is_port(port),
        None => is_host(value),
    }
}

fn is_port(value: &str) -> bool {
    matches!(value.parse::<u16>(), Ok(port) if port > 0)
}

/// IPv4/IPv6 address or CIDR block
pub fn is_ip_or_cidr(value: &str) -> bool {
    match value.split_once('/') {
        None => value.parse::<IpAddr>().is_ok(),
        Some((address, prefix)) => {
            let Ok(address) = address.parse::<IpAddr>() else {
                return false;
            };
            let Ok(prefix) = prefix.parse::<u8>() else {
                return false;
            };
            match address {
                IpAddr::V4(_) => prefix <= 32,
                IpAddr::V6(_) => prefix <= 128,
            }
        }
    }
}

pub fn is_tel_url(value: &str) -> bool {
    TEL_URL.is_match(value)
}

/// Address of record: `sip:` URI or `backend:` reference
pub fn is_aor(value: &str) -> bool {
    ["sip:", "backend:"]
        .iter()
        .any(|scheme| value.len() > scheme.len() && value.starts_with(scheme))
}

pub fn is_country_iso_code(value: &str) -> bool {
    value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase())
}
