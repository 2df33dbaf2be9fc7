use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// A root nameserver, identified by its well-known hostname and one of its
/// published addresses. The default set is exactly the 13 IANA root servers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootServer {
    pub hostname: String,
    pub address: IpAddr,
}

/// Runtime configuration for the diagnostic engine: where to start iterative
/// resolution, how to resolve nameserver addresses, and the bounds placed on
/// every stage. Modeled the way a resolver's own JSON configuration file is
/// loaded and validated before the first query is ever sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conf {
    pub root_servers: Vec<RootServer>,
    pub recursive_resolver: IpAddr,
    pub dns_port: u16,
    pub query_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub batch_concurrency: usize,
    pub kaminsky_spoof_count: u32,
    pub probe_domain: String,
    pub max_ns_discovery_attempts: usize,
    pub max_ns_address_attempts: usize,
}

impl Default for Conf {
    fn default() -> Self {
        Conf {
            root_servers: default_root_servers(),
            recursive_resolver: IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
            dns_port: 53,
            query_timeout_secs: 5,
            probe_timeout_secs: 3,
            batch_concurrency: 20,
            kaminsky_spoof_count: 3000,
            probe_domain: "example.com".to_string(),
            max_ns_discovery_attempts: 3,
            max_ns_address_attempts: 3,
        }
    }
}

impl Conf {
    /// Reads and validates a [`Conf`] from a JSON file on disk.
    pub fn from_file(path: &str) -> Result<Conf, String> {
        let content = fs::read_to_string(path).map_err(|e| format!("cannot read conf file '{}': {}", path, e))?;
        let conf: Conf = serde_json::from_str(&content).map_err(|e| format!("invalid conf file '{}': {}", path, e))?;
        conf.validate()?;
        Ok(conf)
    }

    /// Checks every field for the kind of mistake a hand-edited config file
    /// commonly introduces: zero values, empty lists, out of range ports.
    pub fn validate(&self) -> Result<(), String> {
        if self.root_servers.is_empty() {
            return Err("root_servers must not be empty".to_string());
        }
        if self.dns_port == 0 {
            return Err("dns_port must not be zero".to_string());
        }
        if self.query_timeout_secs == 0 {
            return Err("query_timeout_secs must not be zero".to_string());
        }
        if self.probe_timeout_secs == 0 {
            return Err("probe_timeout_secs must not be zero".to_string());
        }
        if self.batch_concurrency == 0 {
            return Err("batch_concurrency must not be zero".to_string());
        }
        if self.kaminsky_spoof_count == 0 {
            return Err("kaminsky_spoof_count must not be zero".to_string());
        }
        if self.probe_domain.is_empty() {
            return Err("probe_domain must not be empty".to_string());
        }
        if self.max_ns_discovery_attempts == 0 {
            return Err("max_ns_discovery_attempts must not be zero".to_string());
        }
        if self.max_ns_address_attempts == 0 {
            return Err("max_ns_address_attempts must not be zero".to_string());
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// The 13 IANA root nameservers, the same fixed panel a resolver's
/// recursive lookup logic bootstraps its iteration from.
fn default_root_servers() -> Vec<RootServer> {
    const ROOTS: [(&str, [u8; 4]); 13] = [
        ("a.root-servers.net.", [198, 41, 0, 4]),
        ("b.root-servers.net.", [199, 9, 14, 201]),
        ("c.root-servers.net.", [192, 33, 4, 12]),
        ("d.root-servers.net.", [199, 7, 91, 13]),
        ("e.root-servers.net.", [192, 203, 230, 10]),
        ("f.root-servers.net.", [192, 5, 5, 241]),
        ("g.root-servers.net.", [192, 112, 36, 4]),
        ("h.root-servers.net.", [198, 97, 190, 53]),
        ("i.root-servers.net.", [192, 36, 148, 17]),
        ("j.root-servers.net.", [192, 58, 128, 30]),
        ("k.root-servers.net.", [193, 0, 14, 129]),
        ("l.root-servers.net.", [199, 7, 83, 42]),
        ("m.root-servers.net.", [202, 12, 27, 33]),
    ];
    ROOTS
        .iter()
        .map(|(hostname, ip)| RootServer {
            hostname: hostname.to_string(),
            address: IpAddr::V4(Ipv4Addr::from(*ip)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_conf_is_valid() {
        assert!(Conf::default().validate().is_ok());
    }

    #[test]
    fn default_conf_has_thirteen_roots() {
        assert_eq!(Conf::default().root_servers.len(), 13);
    }

    #[test]
    fn rejects_zero_batch_concurrency() {
        let mut conf = Conf::default();
        conf.batch_concurrency = 0;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut conf = Conf::default();
        conf.query_timeout_secs = 0;
        assert!(conf.validate().is_err());
    }

    #[test]
    fn rejects_empty_root_servers() {
        let mut conf = Conf::default();
        conf.root_servers.clear();
        assert!(conf.validate().is_err());
    }
}
