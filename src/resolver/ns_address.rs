use crate::conf::Conf;
use crate::resolver::{build_query, send_and_decode};
use crate::shared::dns::{Name, RecordType, RespCode};
use crate::shared::Sink;
use std::net::IpAddr;

/// Resolves every A and AAAA address for `hostname` against the
/// configured recursive resolver. Per-family failures are logged and
/// non-fatal; only both families failing yields an empty result.
pub fn resolve_ns_addresses(hostname: &Name, conf: &Conf, sink: &dyn Sink) -> Vec<IpAddr> {
    let mut addrs = Vec::new();

    for rt in [RecordType::A, RecordType::AAAA] {
        let query = build_query(hostname, rt, true);
        match send_and_decode(&query, conf.recursive_resolver, conf.dns_port, conf.query_timeout()) {
            Ok(resp) => match resp.header.resp_code {
                RespCode::NoError => {
                    for answer in &resp.answers {
                        match answer.record_type() {
                            RecordType::A => addrs.push(IpAddr::from(*answer.a_data())),
                            RecordType::AAAA => addrs.push(IpAddr::from(*answer.aaaa_data())),
                            _ => {}
                        }
                    }
                }
                other => {
                    sink.warn(
                        "ns_address_unexpected_rcode",
                        &[("hostname", &hostname.to_string()), ("record_type", rt.to_str()), ("rcode", &format!("{:?}", other))],
                    );
                }
            },
            Err(e) => {
                sink.warn(
                    "ns_address_query_failed",
                    &[("hostname", &hostname.to_string()), ("record_type", rt.to_str()), ("error", &e.to_string())],
                );
            }
        }
    }

    addrs.sort();
    addrs.dedup();
    addrs
}
