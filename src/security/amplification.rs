use crate::conf::Conf;
use crate::security::wire::build_any_query;
use crate::shared::dns::{Header, Name, RespCode};
use crate::shared::Sink;
use rand::Rng;
use serde::Serialize;
use std::net::{IpAddr, UdpSocket};

/// Outcome of the amplification-potential probe described in §4.G2: a single
/// raw `ANY` query is sent and the response is classified by size and rcode,
/// never fully decoded (an `ANY` response can legally carry record types
/// this codec doesn't know how to parse).
#[derive(Debug, Clone, Serialize)]
pub enum AmplificationOutcome {
    ProtectedRefused,
    BoundedProtected { response_size: usize },
    PotentialAmplification { response_size: usize },
    Timeout,
}

/// Response sizes at or under this many bytes are considered bounded; a
/// bare query of a handful of bytes producing more than this is the
/// hallmark of a usable amplification vector.
const AMPLIFICATION_THRESHOLD_BYTES: usize = 512;

pub fn run_amplification_probe(server_ip: IpAddr, port: u16, conf: &Conf, sink: &dyn Sink) -> AmplificationOutcome {
    let domain = match probe_domain_name(conf) {
        Some(name) => name,
        None => return AmplificationOutcome::Timeout,
    };

    let bind_addr = match server_ip {
        IpAddr::V4(_) => "0.0.0.0:0",
        IpAddr::V6(_) => "[::]:0",
    };
    let socket = match UdpSocket::bind(bind_addr) {
        Ok(s) => s,
        Err(e) => {
            sink.warn("amplification_probe_bind_failed", &[("error", &e.to_string())]);
            return AmplificationOutcome::Timeout;
        }
    };
    if socket.set_read_timeout(Some(conf.probe_timeout())).is_err() || socket.set_write_timeout(Some(conf.probe_timeout())).is_err() {
        return AmplificationOutcome::Timeout;
    }

    let txid: u16 = rand::thread_rng().gen();
    let query = build_any_query(&domain, txid);
    if socket.send_to(&query, (server_ip, port)).is_err() {
        return AmplificationOutcome::Timeout;
    }

    let mut buf = [0u8; 8192];
    let n = match socket.recv_from(&mut buf) {
        Ok((n, _)) => n,
        Err(_) => {
            sink.warn("amplification_probe", &[("outcome", "timeout")]);
            return AmplificationOutcome::Timeout;
        }
    };

    let outcome = match Header::decode_from_bytes(&buf[..n]) {
        Ok(header) => match header.resp_code {
            RespCode::NoError if n <= AMPLIFICATION_THRESHOLD_BYTES => AmplificationOutcome::BoundedProtected { response_size: n },
            RespCode::NoError => AmplificationOutcome::PotentialAmplification { response_size: n },
            _ => AmplificationOutcome::ProtectedRefused,
        },
        Err(_) if n <= AMPLIFICATION_THRESHOLD_BYTES => AmplificationOutcome::BoundedProtected { response_size: n },
        Err(_) => AmplificationOutcome::PotentialAmplification { response_size: n },
    };

    sink.info("amplification_probe", &[("response_size", &n.to_string())]);
    outcome
}

fn probe_domain_name(conf: &Conf) -> Option<Name> {
    let absolute = format!("{}.", conf.probe_domain.trim_end_matches('.'));
    Name::from_string(&absolute).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_matches_udp_dns_size_boundary() {
        assert_eq!(AMPLIFICATION_THRESHOLD_BYTES, 512);
    }
}
