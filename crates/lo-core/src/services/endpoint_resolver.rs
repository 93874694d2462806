use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use crate::models::{AddressSource, AgentEndpoint, LaunchConfig};

pub const FALLBACK_HOST: &str = "localhost";

/// Used only to let the OS pick a route; no packet is sent.
const ROUTE_PROBE_TARGET: &str = "8.8.8.8:80";

/// Interface name prefixes belonging to container bridges, never the
/// address other hosts reach the gateway on.
const VIRTUAL_INTERFACE_PREFIXES: [&str; 4] = ["docker", "br-", "veth", "virbr"];

/// Builds stable gateway-routed agent URLs.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    host: String,
    source: AddressSource,
    gateway_port: u16,
}

impl EndpointResolver {
    /// Discover the host address once; every resolved URL reuses it.
    pub fn discover(config: &LaunchConfig) -> Self {
        let (host, source) = match &config.gateway_public_host {
            Some(host) => (host.clone(), AddressSource::Configured),
            None => discover_host_address(),
        };
        if source == AddressSource::Fallback {
            tracing::warn!(
                host = %host,
                "no routable interface found; agent URLs will only work on this machine"
            );
        } else {
            tracing::info!(host = %host, source = ?source, "resolved gateway host");
        }
        Self::with_host(host, source, config.gateway_port)
    }

    pub fn with_host(host: impl Into<String>, source: AddressSource, gateway_port: u16) -> Self {
        Self {
            host: host.into(),
            source,
            gateway_port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn source(&self) -> AddressSource {
        self.source
    }

    pub fn resolve(&self, agent_id: &str) -> AgentEndpoint {
        let url = compose_agent_url(&self.host, self.gateway_port, agent_id);
        tracing::info!(agent_id, url = %url, "resolved agent endpoint");
        AgentEndpoint {
            agent_id: agent_id.to_string(),
            url,
            source: self.source,
        }
    }

    pub fn resolve_all<'a, I>(&self, agent_ids: I) -> Vec<AgentEndpoint>
    where
        I: IntoIterator<Item = &'a str>,
    {
        agent_ids.into_iter().map(|id| self.resolve(id)).collect()
    }
}

pub fn compose_agent_url(host: &str, gateway_port: u16, agent_id: &str) -> String {
    format!("http://{host}:{gateway_port}/{agent_id}")
}

/// Interface scan, then the outbound-route trick, then the fallback host.
pub fn discover_host_address() -> (String, AddressSource) {
    discover_with(first_interface_ipv4, outbound_route_address)
}

/// Discovery order with the two lookups supplied by the caller. The route
/// lookup only runs when the interface lookup finds nothing.
pub fn discover_with<I, R>(interface: I, route: R) -> (String, AddressSource)
where
    I: FnOnce() -> Option<Ipv4Addr>,
    R: FnOnce() -> Option<Ipv4Addr>,
{
    if let Some(ip) = interface() {
        return (ip.to_string(), AddressSource::Interface);
    }
    match route() {
        Some(ip) => (ip.to_string(), AddressSource::OutboundRoute),
        None => (FALLBACK_HOST.to_string(), AddressSource::Fallback),
    }
}

fn is_routable(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_link_local() && !ip.is_unspecified()
}

fn is_virtual_interface(name: &str) -> bool {
    VIRTUAL_INTERFACE_PREFIXES
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

fn outbound_route_address() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    if let Err(e) = socket.connect(ROUTE_PROBE_TARGET) {
        tracing::debug!(error = %e, "no outbound route");
        return None;
    }
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if is_routable(ip) => Some(ip),
        _ => None,
    }
}

#[cfg(unix)]
fn first_interface_ipv4() -> Option<Ipv4Addr> {
    use std::ffi::CStr;

    let mut addrs: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut addrs) } != 0 {
        tracing::debug!(error = %std::io::Error::last_os_error(), "getifaddrs failed");
        return None;
    }

    let mut found = None;
    let mut cursor = addrs;
    while !cursor.is_null() {
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;

        let up = entry.ifa_flags & (libc::IFF_UP as libc::c_uint) != 0;
        if entry.ifa_addr.is_null() || !up {
            continue;
        }
        if i32::from(unsafe { (*entry.ifa_addr).sa_family }) != libc::AF_INET {
            continue;
        }
        let name = unsafe { CStr::from_ptr(entry.ifa_name) }.to_string_lossy();
        if is_virtual_interface(&name) {
            continue;
        }
        let sin = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
        let ip = Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr));
        if is_routable(ip) {
            found = Some(ip);
            break;
        }
    }

    unsafe { libc::freeifaddrs(addrs) };
    found
}

#[cfg(not(unix))]
fn first_interface_ipv4() -> Option<Ipv4Addr> {
    None
}
