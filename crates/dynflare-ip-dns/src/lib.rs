// # DNS IP Resolver
//
// This crate discovers the caller's public IPv4 address with a single DNS
// query, for the dynflare update cycle.
//
// ## How It Works
//
// Some resolvers answer a well-known name with the address the query came
// from. The default pairing is `myip.opendns.com` asked of
// `resolver1.opendns.com`:
//
// ```text
// $ dig +short myip.opendns.com @resolver1.opendns.com
// 203.0.113.7
// ```
//
// ## Behavior
//
// - Exactly one A query over UDP to the configured resolver (port 53 unless
//   given); no CNAME chasing, no retries, no answer cache
// - The answer section of that one reply is scanned in order; the first A
//   record wins and other record types (e.g. CNAME) are skipped
// - Replies whose id does not match the query are ignored until the timeout

use async_trait::async_trait;
use dynflare_core::traits::IpResolver;
use dynflare_core::{Error, Result};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RData, RecordType};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

/// Standard DNS port
const DNS_PORT: u16 = 53;

/// Default time to wait for the answer
const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest classic DNS message carried over UDP
const MAX_UDP_SIZE: usize = 512;

/// Resolver that asks a DNS server for the caller's own address
#[derive(Debug, Clone)]
pub struct DnsIpResolver {
    /// Time to wait for one answer
    timeout: Duration,
}

impl DnsIpResolver {
    /// Create a resolver with the default query timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_QUERY_TIMEOUT)
    }

    /// Create a resolver with a custom query timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Send `query` to `server` and wait for the reply carrying its id
    async fn exchange(&self, server: SocketAddr, query: &Message) -> Result<Message> {
        let bind_addr: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| Error::lookup(format!("DNS query failed: {}", e)))?;
        socket
            .connect(server)
            .await
            .map_err(|e| Error::lookup(format!("DNS query failed: {}", e)))?;

        let bytes = query
            .to_vec()
            .map_err(|e| Error::lookup(format!("failed to encode DNS query: {}", e)))?;
        socket
            .send(&bytes)
            .await
            .map_err(|e| Error::lookup(format!("DNS query failed: {}", e)))?;

        tokio::time::timeout(self.timeout, async {
            let mut buf = [0u8; MAX_UDP_SIZE];
            loop {
                let len = match socket.recv(&mut buf).await {
                    Ok(len) => len,
                    Err(e) => return Err(Error::lookup(format!("DNS query failed: {}", e))),
                };

                match Message::from_vec(&buf[..len]) {
                    Ok(reply) if reply.id() == query.id() => return Ok(reply),
                    Ok(reply) => {
                        tracing::debug!("Ignoring DNS reply with unexpected id {}", reply.id())
                    }
                    Err(e) => tracing::debug!("Ignoring undecodable DNS reply: {}", e),
                }
            }
        })
        .await
        .map_err(|_| {
            Error::lookup(format!(
                "DNS query failed: no reply from {} within {:?}",
                server, self.timeout
            ))
        })?
    }
}

impl Default for DnsIpResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IpResolver for DnsIpResolver {
    async fn resolve(&self, hostname: &str, server: &str) -> Result<Ipv4Addr> {
        let server_addr = name_server_addr(server).await?;
        let query = a_query(hostname)?;

        tracing::debug!("Querying {} for A {}", server_addr, fqdn(hostname));

        let reply = self.exchange(server_addr, &query).await?;
        tracing::trace!(
            "DNS reply from {}: {} answer(s), {:?}",
            server_addr,
            reply.answers().len(),
            reply.response_code()
        );

        first_ipv4(reply.answers().iter().map(|record| record.data()))
    }
}

/// Build a recursive A query for `hostname` with a random id
fn a_query(hostname: &str) -> Result<Message> {
    let name = Name::from_ascii(fqdn(hostname))
        .map_err(|e| Error::lookup(format!("invalid lookup name {}: {}", hostname, e)))?;

    let mut message = Message::new();
    message
        .set_id(rand::random::<u16>())
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true)
        .add_query(Query::query(name, RecordType::A));
    Ok(message)
}

/// Pick the first A record out of a DNS answer section
///
/// Fails when the answer is empty or holds no A record.
pub fn first_ipv4<'a, I>(answers: I) -> Result<Ipv4Addr>
where
    I: IntoIterator<Item = &'a RData>,
{
    let mut seen = Vec::new();

    for data in answers {
        if let RData::A(a) = data {
            return Ok(a.0);
        }
        seen.push(data.record_type().to_string());
    }

    if seen.is_empty() {
        Err(Error::lookup("no DNS results"))
    } else {
        Err(Error::lookup(format!(
            "unexpected DNS result, no usable records: [{}]",
            seen.join(", ")
        )))
    }
}

/// Append the root label so the name is never expanded with search domains
fn fqdn(hostname: &str) -> String {
    if hostname.ends_with('.') {
        hostname.to_string()
    } else {
        format!("{}.", hostname)
    }
}

/// Turn the configured resolver address into a socket address
///
/// Accepts `ip:port`, a bare IP (port 53), or a host name (port 53 of its
/// first resolved address).
async fn name_server_addr(server: &str) -> Result<SocketAddr> {
    if let Ok(addr) = server.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = server.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    tokio::net::lookup_host((server, DNS_PORT))
        .await
        .map_err(|e| Error::lookup(format!("failed to resolve DNS server {}: {}", server, e)))?
        .next()
        .ok_or_else(|| Error::lookup(format!("DNS server {} has no addresses", server)))
}
