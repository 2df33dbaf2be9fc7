pub mod amplification;
pub mod kaminsky;
pub mod wire;

pub use amplification::{run_amplification_probe, AmplificationOutcome};
pub use kaminsky::{run_kaminsky_probe, TxidProbeOutcome};

use crate::conf::Conf;
use crate::shared::Sink;
use serde::Serialize;
use std::net::IpAddr;

/// Combined result of both security probes run against one server.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub txid_probe: TxidProbeOutcome,
    pub amplification_probe: AmplificationOutcome,
}

/// Runs both security probes against `(server_ip, port)` in turn. The probes
/// share a single target but are otherwise independent; a failure in one
/// does not prevent the other from running.
pub fn run_probe(server_ip: IpAddr, port: u16, conf: &Conf, sink: &dyn Sink) -> ProbeReport {
    sink.info("probe_started", &[("server", &server_ip.to_string())]);
    let txid_probe = run_kaminsky_probe(server_ip, port, conf, sink);
    let amplification_probe = run_amplification_probe(server_ip, port, conf, sink);
    ProbeReport { txid_probe, amplification_probe }
}
