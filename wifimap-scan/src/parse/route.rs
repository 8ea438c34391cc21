//! Default gateway lookups from the routing table tools of each platform

use std::net::IpAddr;

fn ip(token: &str) -> Option<IpAddr> {
    token.trim().parse().ok()
}

/// `route -n get default` (macOS): `gateway: 192.168.1.1`
pub fn parse_route_get(output: &str) -> Option<IpAddr> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "gateway" {
            return None;
        }
        ip(value)
    })
}

/// `netstat -rn`: second column of the first default route
pub fn parse_netstat(output: &str) -> Option<IpAddr> {
    output
        .lines()
        .map(str::trim)
        .filter(|row| row.starts_with("default") || row.starts_with("0.0.0.0"))
        .find_map(|row| row.split_whitespace().nth(1).and_then(ip))
}

/// `ip route show default`: `default via 10.0.0.1 dev wlan0 ...`
pub fn parse_ip_route(output: &str) -> Option<IpAddr> {
    output.lines().find_map(|line| {
        let mut tokens = line.split_whitespace();
        if tokens.next()? != "default" {
            return None;
        }
        tokens.skip_while(|t| *t != "via").nth(1).and_then(ip)
    })
}

/// `route print -4 0.0.0.0` (Windows): destination and netmask are both
/// `0.0.0.0`, the gateway follows
pub fn parse_route_print(output: &str) -> Option<IpAddr> {
    output.lines().find_map(|line| {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["0.0.0.0", "0.0.0.0", gateway, ..] => ip(gateway),
            _ => None,
        }
    })
}
