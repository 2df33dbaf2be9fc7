use crate::shared::dns;
use std::io;

/// Errors surfaced by every stage of a domain analysis: name validation,
/// authoritative nameserver discovery, nameserver address resolution and
/// the record interrogation itself. A single enum keeps retry policy
/// (see [`DiagnosticErr::is_retryable`]) and reporting in one place,
/// mirroring how the wire codec keeps all its errors in [`dns::ParsingErr`].
#[derive(Debug)]
pub enum DiagnosticErr {
    InvalidDomain(String),
    NonexistentDomain(dns::Name),
    NoTldServers,
    NoAuthoritativeServers,
    NoServerAddresses(dns::Name),
    MalformedResponse(String),
    UnexpectedRespCode(dns::RespCode),
    Timeout,
    Network(io::Error),
}

impl DiagnosticErr {
    /// Transient failures (network hiccups, timeouts, an empty referral from
    /// one particular server) are worth retrying at the batch level. A domain
    /// confirmed not to exist, or rejected before any query is sent, is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            DiagnosticErr::InvalidDomain(_) => false,
            DiagnosticErr::NonexistentDomain(_) => false,
            DiagnosticErr::NoTldServers
            | DiagnosticErr::NoAuthoritativeServers
            | DiagnosticErr::NoServerAddresses(_)
            | DiagnosticErr::MalformedResponse(_)
            | DiagnosticErr::UnexpectedRespCode(_)
            | DiagnosticErr::Timeout
            | DiagnosticErr::Network(_) => true,
        }
    }
}

impl From<io::Error> for DiagnosticErr {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => DiagnosticErr::Timeout,
            _ => DiagnosticErr::Network(e),
        }
    }
}

impl From<dns::MessageErr> for DiagnosticErr {
    fn from(e: dns::MessageErr) -> Self {
        DiagnosticErr::MalformedResponse(format!("{:?}", e))
    }
}

impl std::fmt::Display for DiagnosticErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticErr::InvalidDomain(msg) => write!(f, "invalid domain: {}", msg),
            DiagnosticErr::NonexistentDomain(name) => write!(f, "domain does not exist: {}", name),
            DiagnosticErr::NoTldServers => write!(f, "no nameservers found for the top-level domain"),
            DiagnosticErr::NoAuthoritativeServers => write!(f, "no authoritative nameservers found"),
            DiagnosticErr::NoServerAddresses(name) => write!(f, "could not resolve any address for {}", name),
            DiagnosticErr::MalformedResponse(msg) => write!(f, "malformed response: {}", msg),
            DiagnosticErr::UnexpectedRespCode(code) => write!(f, "unexpected response code: {:?}", code),
            DiagnosticErr::Timeout => write!(f, "query timed out"),
            DiagnosticErr::Network(e) => write!(f, "network error: {}", e),
        }
    }
}
