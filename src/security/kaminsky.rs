use crate::conf::Conf;
use crate::security::wire::build_spoof_response;
use crate::shared::dns::{Class, Header, Message, Name, Question, RecordType};
use crate::shared::Sink;
use crate::transport;
use rand::Rng;
use serde::Serialize;
use std::net::{IpAddr, UdpSocket};
use std::thread;
use std::time::Duration;

/// Outcome of the transaction-ID-guessing race described in §4.G1.
#[derive(Debug, Clone, Serialize)]
pub enum TxidProbeOutcome {
    AttackDidNotLand,
    PotentialSusceptibility,
    Timeout,
}

/// Races a burst of spoofed responses against one genuine query, both
/// targeting `(server_ip, port)`. The spoof burst starts at least 500ms
/// before the genuine query is sent, giving an off-path attacker's
/// head start its due weight without requiring the burst to actually win.
pub fn run_kaminsky_probe(server_ip: IpAddr, port: u16, conf: &Conf, sink: &dyn Sink) -> TxidProbeOutcome {
    let probe_domain = match probe_domain_name(conf) {
        Some(name) => name,
        None => return TxidProbeOutcome::Timeout,
    };
    let txid: u16 = rand::thread_rng().gen();
    let spoof_count = conf.kaminsky_spoof_count;

    let genuine_socket = match transport::bind_ephemeral(conf.probe_timeout()) {
        Ok(socket) => socket,
        Err(_) => return TxidProbeOutcome::Timeout,
    };

    thread::scope(|scope| {
        scope.spawn(|| {
            send_spoof_burst(&probe_domain, server_ip, port, spoof_count, sink);
        });

        thread::sleep(Duration::from_millis(500));

        let mut header = Header::default();
        header.recursion_desired = true;
        header.id = txid;
        header.questions_count = 1;
        let query = Message {
            header,
            questions: vec![Question { node: probe_domain.clone(), record_type: RecordType::A, class: Class::IN }],
            answers: vec![],
            authorities: vec![],
            additionals: vec![],
        };

        let bytes = match query.encode_to_bytes() {
            Ok(b) => b,
            Err(_) => return TxidProbeOutcome::Timeout,
        };
        if genuine_socket.send_to(&bytes, (server_ip, port)).is_err() {
            return TxidProbeOutcome::Timeout;
        }

        let mut buf = [0u8; 4096];
        match genuine_socket.recv_from(&mut buf) {
            Ok((n, _)) => match Message::decode_from_bytes(&buf[..n]) {
                Ok(resp) if resp.header.id == txid => {
                    sink.info("kaminsky_probe", &[("outcome", "attack_did_not_land")]);
                    TxidProbeOutcome::AttackDidNotLand
                }
                Ok(_) => {
                    sink.error("kaminsky_probe", &[("outcome", "potential_susceptibility")]);
                    TxidProbeOutcome::PotentialSusceptibility
                }
                Err(_) => {
                    sink.warn("kaminsky_probe", &[("outcome", "malformed_response")]);
                    TxidProbeOutcome::Timeout
                }
            },
            Err(_) => {
                sink.warn("kaminsky_probe", &[("outcome", "timeout")]);
                TxidProbeOutcome::Timeout
            }
        }
    })
}

fn send_spoof_burst(probe_domain: &Name, server_ip: IpAddr, port: u16, count: u32, sink: &dyn Sink) {
    let bind_addr = match server_ip {
        IpAddr::V4(_) => "0.0.0.0:0",
        IpAddr::V6(_) => "[::]:0",
    };
    let socket = match UdpSocket::bind(bind_addr) {
        Ok(s) => s,
        Err(e) => {
            sink.warn("kaminsky_spoof_burst_failed", &[("error", &e.to_string())]);
            return;
        }
    };

    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let spoof_txid: u16 = rng.gen();
        let packet = build_spoof_response(probe_domain, spoof_txid);
        let _ = socket.send_to(&packet, (server_ip, port));
    }
    sink.info("kaminsky_spoof_burst_sent", &[("count", &count.to_string())]);
}

fn probe_domain_name(conf: &Conf) -> Option<Name> {
    let absolute = format!("{}.", conf.probe_domain.trim_end_matches('.'));
    Name::from_string(&absolute).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_domain_name_normalizes_to_absolute_form() {
        let conf = Conf::default();
        let name = probe_domain_name(&conf).unwrap();
        assert!(name.to_string().ends_with('.'));
    }
}
