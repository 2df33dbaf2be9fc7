use crate::conf::Conf;
use crate::domain::parse_external_domain;
use crate::errors::DiagnosticErr;
use crate::interrogate::interrogate;
use crate::report::AnalysisReport;
use crate::resolver::{discover_authoritative_ns, resolve_ns_addresses, NsHostname};
use crate::shared::{Semaphore, Sink};
use std::net::IpAddr;
use std::sync::Mutex;
use std::thread;

/// Result of analyzing a single domain, paired with the input string it
/// came from so batch output can be matched back up to the request.
pub struct DomainOutcome {
    pub domain: String,
    pub result: Result<AnalysisReport, DiagnosticErr>,
}

/// Runs one domain through authoritative NS discovery, NS address
/// resolution and per-pair interrogation, applying the retry policy
/// of the batch orchestrator even for single-domain invocations.
pub fn analyze_domain(domain_input: &str, conf: &Conf, sink: &dyn Sink) -> Result<AnalysisReport, DiagnosticErr> {
    let domain = parse_external_domain(domain_input)?;

    let ns_hostnames = retry(conf.max_ns_discovery_attempts, || discover_authoritative_ns(&domain, conf, sink))?;

    let pairs: Vec<(NsHostname, IpAddr)> = retry(conf.max_ns_address_attempts, || {
        let mut local_pairs = Vec::new();
        for ns in &ns_hostnames {
            let ips = if !ns.glue.is_empty() { ns.glue.clone() } else { resolve_ns_addresses(&ns.hostname, conf, sink) };
            for ip in ips {
                local_pairs.push((ns.clone(), ip));
            }
        }
        if local_pairs.is_empty() {
            Err(DiagnosticErr::NoServerAddresses(domain.clone()))
        } else {
            Ok(local_pairs)
        }
    })?;

    let domain_ref = &domain;
    let report = Mutex::new(AnalysisReport::new());
    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(pairs.len());
        for (ns, ip) in &pairs {
            let report = &report;
            handles.push(scope.spawn(move || {
                let result = interrogate(domain_ref, &ns.hostname, *ip, conf, sink);
                let mut guard = report.lock().unwrap();
                guard.insert_pair(&ns.hostname.to_string(), &ip.to_string(), result);
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    });

    Ok(report.into_inner().unwrap())
}

/// Runs `f` up to `max_attempts` times, stopping early on a non-retryable
/// error. Replaces a retry loop that, in the source this was distilled
/// from, reset its attempt counter on every outer call and so never
/// actually bounded the number of attempts.
fn retry<T>(max_attempts: usize, mut f: impl FnMut() -> Result<T, DiagnosticErr>) -> Result<T, DiagnosticErr> {
    let mut last_err = None;
    for _ in 0..max_attempts {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let retryable = e.is_retryable();
                last_err = Some(e);
                if !retryable {
                    break;
                }
            }
        }
    }
    Err(last_err.unwrap())
}

/// Schedules one analysis per domain, bounding the number concurrently
/// in-flight to `conf.batch_concurrency` via a counting semaphore. Input
/// order is preserved in the returned vector regardless of completion order.
pub fn run_batch(domains: &[String], conf: &Conf, sink: &dyn Sink) -> Vec<DomainOutcome> {
    let sem = Semaphore::new(conf.batch_concurrency.max(1));
    let results: Vec<Mutex<Option<DomainOutcome>>> = (0..domains.len()).map(|_| Mutex::new(None)).collect();

    thread::scope(|scope| {
        for (i, domain) in domains.iter().enumerate() {
            sem.acquire();
            let sem = &sem;
            let results = &results;
            scope.spawn(move || {
                let outcome = analyze_domain(domain, conf, sink);
                *results[i].lock().unwrap() = Some(DomainOutcome { domain: domain.clone(), result: outcome });
                sem.release();
            });
        }
    });

    results.into_iter().map(|m| m.into_inner().unwrap().unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::dns::Name;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn retry_stops_after_max_attempts_on_retryable_error() {
        let attempts = AtomicUsize::new(0);
        let result: Result<(), DiagnosticErr> = retry(3, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(DiagnosticErr::Timeout)
        });
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn retry_stops_immediately_on_non_retryable_error() {
        let attempts = AtomicUsize::new(0);
        let domain = Name::from_string("example.com.").unwrap();
        let result: Result<(), DiagnosticErr> = retry(3, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(DiagnosticErr::NonexistentDomain(domain.clone()))
        });
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retry_returns_first_success() {
        let attempts = AtomicUsize::new(0);
        let result = retry(3, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                Err(DiagnosticErr::Timeout)
            } else {
                Ok(42)
            }
        });
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn run_batch_preserves_input_order() {
        let conf = Conf::default();
        let domains = vec!["not a domain!!".to_string(), "also not valid!!".to_string()];
        let outcomes = run_batch(&domains, &conf, &crate::shared::sink::VecSink::new());
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].domain, domains[0]);
        assert_eq!(outcomes[1].domain, domains[1]);
        assert!(outcomes.iter().all(|o| o.result.is_err()));
    }
}
