use crate::conf::Conf;
use crate::report::PerPairResult;
use crate::resolver::{build_query, send_and_decode};
use crate::shared::dns::{Name, RecordType, RespCode};
use crate::shared::Sink;
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Instant;

/// The fixed record-type panel queried against every authoritative pair,
/// in the order results must be requested (observable timing/NXDOMAIN
/// short-circuit behavior depends on this order).
pub const RECORD_PANEL: [RecordType; 6] = [
    RecordType::A,
    RecordType::AAAA,
    RecordType::MX,
    RecordType::TXT,
    RecordType::SOA,
    RecordType::CAA,
];

/// Issues the record-type panel for `domain` against a single (ns hostname,
/// ns ip) pair, sequentially, in panel order. An NXDOMAIN for any type in
/// the panel terminates the panel early for this pair.
pub fn interrogate(domain: &Name, ns_hostname: &Name, ns_ip: IpAddr, conf: &Conf, sink: &dyn Sink) -> PerPairResult {
    let mut result: PerPairResult = BTreeMap::new();

    for &rt in RECORD_PANEL.iter() {
        let query = build_query(domain, rt, false);
        let started = Instant::now();
        match send_and_decode(&query, ns_ip, conf.dns_port, conf.query_timeout()) {
            Ok(resp) => match resp.header.resp_code {
                RespCode::NxDomain => {
                    sink.info(
                        "nxdomain_short_circuit",
                        &[("domain", &domain.to_string()), ("ns", &ns_hostname.to_string()), ("record_type", rt.to_str())],
                    );
                    break;
                }
                RespCode::NoError => {
                    let texts: Vec<String> =
                        resp.answers.iter().filter(|r| r.record_type() == rt).map(|r| r.to_text()).collect();
                    if !texts.is_empty() {
                        sink.info(
                            "record_found",
                            &[
                                ("domain", &domain.to_string()),
                                ("ns", &ns_hostname.to_string()),
                                ("record_type", rt.to_str()),
                                ("count", &texts.len().to_string()),
                                ("elapsed_ms", &started.elapsed().as_millis().to_string()),
                            ],
                        );
                        result.insert(rt.to_str().to_string(), texts);
                    }
                }
                _ => {}
            },
            Err(e) => {
                sink.warn(
                    "interrogation_query_failed",
                    &[
                        ("domain", &domain.to_string()),
                        ("ns", &ns_hostname.to_string()),
                        ("record_type", rt.to_str()),
                        ("error", &e.to_string()),
                    ],
                );
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::RECORD_PANEL;
    use crate::shared::dns::RecordType;

    #[test]
    fn panel_order_matches_specification() {
        assert_eq!(
            RECORD_PANEL,
            [RecordType::A, RecordType::AAAA, RecordType::MX, RecordType::TXT, RecordType::SOA, RecordType::CAA]
        );
    }
}
