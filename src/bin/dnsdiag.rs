use clap::{Parser, Subcommand};
use dns_diagnostics::batch::{analyze_domain, run_batch};
use dns_diagnostics::conf::Conf;
use dns_diagnostics::security::run_probe;
use dns_diagnostics::shared::sink::{Level, StderrSink};
use dns_diagnostics::shared::Sink;
use std::fs;
use std::net::IpAddr;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "dnsdiag", about = "Iterative DNS diagnostics and security probing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve authoritative nameservers for a single domain and interrogate them.
    Analyze {
        domain: String,
        #[arg(long)]
        config: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run the same analysis concurrently over many domains.
    Batch {
        /// One or more domains, or a path to a newline-separated domain file.
        targets: Vec<String>,
        #[arg(long)]
        concurrency: Option<usize>,
        #[arg(long)]
        config: Option<String>,
    },
    /// Probe a DNS server for TXID-guessing susceptibility and amplification potential.
    Probe {
        server_ip: IpAddr,
        #[arg(long, default_value_t = 53)]
        port: u16,
        #[arg(long)]
        config: Option<String>,
    },
}

fn load_conf(path: &Option<String>) -> Result<Conf, String> {
    match path {
        Some(p) => Conf::from_file(p),
        None => Ok(Conf::default()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let sink = StderrSink::new(Level::Info);

    match cli.command {
        Command::Analyze { domain, config, json } => {
            let conf = match load_conf(&config) {
                Ok(c) => c,
                Err(e) => {
                    sink.error("config_load_failed", &[("error", &e)]);
                    return ExitCode::from(1);
                }
            };
            match analyze_domain(&domain, &conf, &sink) {
                Ok(report) if !report.is_empty() => {
                    if json {
                        println!("{}", report.to_json_pretty().unwrap_or_default());
                    }
                    ExitCode::from(0)
                }
                Ok(_) => {
                    sink.error("empty_report", &[("domain", &domain)]);
                    ExitCode::from(1)
                }
                Err(e) => {
                    sink.error("analysis_failed", &[("domain", &domain), ("error", &e.to_string())]);
                    ExitCode::from(1)
                }
            }
        }
        Command::Batch { targets, concurrency, config } => {
            let mut conf = match load_conf(&config) {
                Ok(c) => c,
                Err(e) => {
                    sink.error("config_load_failed", &[("error", &e)]);
                    return ExitCode::from(1);
                }
            };
            if let Some(k) = concurrency {
                conf.batch_concurrency = k;
            }

            let domains = expand_targets(&targets);
            let outcomes = run_batch(&domains, &conf, &sink);

            let mut any_failed = false;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(report) if !report.is_empty() => {
                        println!("{}", report.to_json_pretty().unwrap_or_default());
                    }
                    Ok(_) => {
                        any_failed = true;
                        sink.error("empty_report", &[("domain", &outcome.domain)]);
                    }
                    Err(e) => {
                        any_failed = true;
                        sink.error("analysis_failed", &[("domain", &outcome.domain), ("error", &e.to_string())]);
                    }
                }
            }
            ExitCode::from(if any_failed { 1 } else { 0 })
        }
        Command::Probe { server_ip, port, config } => {
            let conf = match load_conf(&config) {
                Ok(c) => c,
                Err(e) => {
                    sink.error("config_load_failed", &[("error", &e)]);
                    return ExitCode::from(1);
                }
            };
            let report = run_probe(server_ip, port, &conf, &sink);
            println!("{}", serde_json::to_string_pretty(&report).unwrap_or_default());
            ExitCode::from(0)
        }
    }
}

/// A single target that names an existing file is treated as a newline-separated
/// domain list; everything else is taken as a literal domain.
fn expand_targets(targets: &[String]) -> Vec<String> {
    if targets.len() == 1 {
        if let Ok(content) = fs::read_to_string(&targets[0]) {
            return content.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect();
        }
    }
    targets.to_vec()
}
