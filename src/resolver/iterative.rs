use crate::conf::Conf;
use crate::errors::DiagnosticErr;
use crate::resolver::{build_query, send_and_decode};
use crate::shared::dns::{Message, Name, Record, RecordType, RespCode};
use crate::shared::Sink;
use std::net::IpAddr;
use std::time::Instant;

/// An authoritative (or TLD) nameserver hostname, with glue addresses
/// carried in the additional section of the response that named it, if any.
#[derive(Debug, Clone)]
pub struct NsHostname {
    pub hostname: Name,
    pub glue: Vec<IpAddr>,
}

/// Walks root -> TLD -> authoritative for `domain`, returning the set of
/// authoritative NS hostnames (with glue, where the delegation provided it).
pub fn discover_authoritative_ns(domain: &Name, conf: &Conf, sink: &dyn Sink) -> Result<Vec<NsHostname>, DiagnosticErr> {
    let tld = domain.tld();

    let mut tld_candidates: Vec<NsHostname> = Vec::new();
    for root in &conf.root_servers {
        let query = build_query(&tld, RecordType::NS, false);
        let started = Instant::now();
        match send_and_decode(&query, root.address, conf.dns_port, conf.query_timeout()) {
            Ok(resp) => match resp.header.resp_code {
                RespCode::NxDomain => {
                    sink.error("root_nxdomain", &[("tld", &tld.to_string()), ("root", &root.hostname)]);
                    return Err(DiagnosticErr::NonexistentDomain(tld));
                }
                RespCode::NoError => {
                    let candidates = extract_ns_with_glue(&resp);
                    if !candidates.is_empty() {
                        sink.info(
                            "root_ns_discovered",
                            &[
                                ("tld", &tld.to_string()),
                                ("root", &root.hostname),
                                ("elapsed_ms", &started.elapsed().as_millis().to_string()),
                            ],
                        );
                        tld_candidates = candidates;
                        break;
                    }
                }
                other => {
                    sink.warn("root_unexpected_rcode", &[("root", &root.hostname), ("rcode", &format!("{:?}", other))]);
                }
            },
            Err(e) => {
                sink.warn("root_query_failed", &[("root", &root.hostname), ("error", &e.to_string())]);
            }
        }
    }

    if tld_candidates.is_empty() {
        return Err(DiagnosticErr::NoTldServers);
    }

    for ns in &tld_candidates {
        let candidate_ips: Vec<IpAddr> = if !ns.glue.is_empty() {
            ns.glue.clone()
        } else {
            super::resolve_ns_addresses(&ns.hostname, conf, sink)
        };

        for ip in candidate_ips {
            let query = build_query(domain, RecordType::NS, false);
            match send_and_decode(&query, ip, conf.dns_port, conf.query_timeout()) {
                Ok(resp) => match resp.header.resp_code {
                    RespCode::NxDomain => {
                        sink.error("tld_nxdomain", &[("domain", &domain.to_string()), ("ns", &ns.hostname.to_string())]);
                        return Err(DiagnosticErr::NonexistentDomain(domain.clone()));
                    }
                    RespCode::NoError => {
                        let authoritative = extract_ns_with_glue(&resp);
                        if !authoritative.is_empty() {
                            sink.info(
                                "authoritative_ns_discovered",
                                &[
                                    ("domain", &domain.to_string()),
                                    ("via", &ns.hostname.to_string()),
                                    ("count", &authoritative.len().to_string()),
                                ],
                            );
                            return Ok(authoritative);
                        }
                    }
                    other => {
                        sink.warn(
                            "tld_unexpected_rcode",
                            &[("ns", &ns.hostname.to_string()), ("rcode", &format!("{:?}", other))],
                        );
                    }
                },
                Err(e) => {
                    sink.warn(
                        "tld_query_failed",
                        &[("ns", &ns.hostname.to_string()), ("ip", &ip.to_string()), ("error", &e.to_string())],
                    );
                }
            }
        }
    }

    Err(DiagnosticErr::NoAuthoritativeServers)
}

/// Extracts NS hostnames from `msg` (answer section preferred, authority
/// section as fallback) and pairs each with any matching glue address
/// found in the additional section.
fn extract_ns_with_glue(msg: &Message) -> Vec<NsHostname> {
    let mut ns_records: Vec<&Record> = msg.answers.iter().filter(|r| r.record_type() == RecordType::NS).collect();
    if ns_records.is_empty() {
        ns_records = msg.authorities.iter().filter(|r| r.record_type() == RecordType::NS).collect();
    }

    ns_records
        .into_iter()
        .map(|r| {
            let hostname = r.ns_data().clone();
            let glue = msg
                .additionals
                .iter()
                .filter_map(|a| match a.record_type() {
                    RecordType::A if a.node().eq_ignore_case(&hostname) => Some(IpAddr::from(*a.a_data())),
                    RecordType::AAAA if a.node().eq_ignore_case(&hostname) => Some(IpAddr::from(*a.aaaa_data())),
                    _ => None,
                })
                .collect();
            NsHostname { hostname, glue }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::dns::Class;

    fn ns_record(node: &str, target: &str) -> Record {
        Record::NS {
            node: Name::from_string(node).unwrap(),
            class: Class::IN,
            ttl: 3600,
            data_len: 0,
            name: Name::from_string(target).unwrap(),
        }
    }

    fn a_record(node: &str, addr: [u8; 4]) -> Record {
        Record::A {
            node: Name::from_string(node).unwrap(),
            class: Class::IN,
            ttl: 3600,
            data_len: 4,
            address: addr,
        }
    }

    #[test]
    fn extracts_glue_matching_case_insensitively() {
        let msg = Message {
            header: crate::shared::dns::Header::default(),
            questions: vec![],
            answers: vec![],
            authorities: vec![ns_record("example.com.", "NS1.Example.com.")],
            additionals: vec![a_record("ns1.example.com.", [192, 0, 2, 1])],
        };
        let result = extract_ns_with_glue(&msg);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].glue, vec![IpAddr::from([192, 0, 2, 1])]);
    }

    #[test]
    fn falls_back_to_authority_when_answer_empty() {
        let msg = Message {
            header: crate::shared::dns::Header::default(),
            questions: vec![],
            answers: vec![],
            authorities: vec![ns_record("com.", "a.gtld-servers.net.")],
            additionals: vec![],
        };
        let result = extract_ns_with_glue(&msg);
        assert_eq!(result.len(), 1);
        assert!(result[0].glue.is_empty());
    }
}
