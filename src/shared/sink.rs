use chrono::Local;
use colored::*;
use std::sync::Mutex;

/// Severity of a single logged event, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    fn label(&self) -> ColoredString {
        match self {
            Level::Debug => "DEBUG".normal(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
        }
    }
}

/// Destination for structured diagnostic events. Every component that wants
/// to report progress (the resolver, the interrogator, the batch orchestrator,
/// the security probes) takes a `&dyn Sink` instead of calling a global logger,
/// so callers choose where events go and tests can inspect them directly.
pub trait Sink: Send + Sync {
    fn record(&self, level: Level, event: &str, fields: &[(&str, &str)]);

    fn debug(&self, event: &str, fields: &[(&str, &str)]) {
        self.record(Level::Debug, event, fields)
    }
    fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.record(Level::Info, event, fields)
    }
    fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.record(Level::Warn, event, fields)
    }
    fn error(&self, event: &str, fields: &[(&str, &str)]) {
        self.record(Level::Error, event, fields)
    }
}

/// Default [`Sink`] used by the CLI. Renders timestamped, colored lines to
/// stderr so reports can still be piped to stdout as clean JSON.
pub struct StderrSink {
    pub min_level: Level,
}

impl StderrSink {
    pub fn new(min_level: Level) -> Self {
        StderrSink { min_level }
    }
}

impl Sink for StderrSink {
    fn record(&self, level: Level, event: &str, fields: &[(&str, &str)]) {
        if level < self.min_level {
            return;
        }
        let now = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let mut line = format!("{} {} {}", now.to_string().dimmed(), level.label(), event);
        for (k, v) in fields {
            line.push_str(&format!(" {}={}", k.dimmed(), v));
        }
        eprintln!("{}", line);
    }
}

/// Test double that collects every recorded event in memory, so assertions
/// can check that a given stage actually reported what it claims to.
pub struct VecSink {
    events: Mutex<Vec<(Level, String, Vec<(String, String)>)>>,
}

impl VecSink {
    pub fn new() -> Self {
        VecSink { events: Mutex::new(Vec::new()) }
    }

    pub fn events(&self) -> Vec<(Level, String, Vec<(String, String)>)> {
        self.events.lock().unwrap().clone()
    }
}

impl Default for VecSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for VecSink {
    fn record(&self, level: Level, event: &str, fields: &[(&str, &str)]) {
        let owned = fields.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self.events.lock().unwrap().push((level, event.to_string(), owned));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_collects_events_in_order() {
        let sink = VecSink::new();
        sink.info("query_sent", &[("ns", "a.root-servers.net.")]);
        sink.warn("query_timeout", &[("attempt", "1")]);
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].1, "query_sent");
        assert_eq!(events[1].0, Level::Warn);
    }
}
