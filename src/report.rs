use serde::Serialize;
use std::collections::BTreeMap;

/// Record type -> textual records observed for one (ns hostname, ns ip) pair.
pub type PerPairResult = BTreeMap<String, Vec<String>>;

/// `ns hostname -> ns ip -> per-pair result`, the report shape described in
/// the external interfaces section: a nested mapping serialized as indented
/// JSON, with deterministic key ordering courtesy of the underlying `BTreeMap`.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AnalysisReport(pub BTreeMap<String, BTreeMap<String, PerPairResult>>);

impl AnalysisReport {
    pub fn new() -> Self {
        AnalysisReport(BTreeMap::new())
    }

    pub fn insert_pair(&mut self, ns_hostname: &str, ns_ip: &str, result: PerPairResult) {
        self.0.entry(ns_hostname.to_string()).or_default().insert(ns_ip.to_string(), result);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_nested_json() {
        let mut report = AnalysisReport::new();
        let mut pair_result = PerPairResult::new();
        pair_result.insert("A".to_string(), vec!["93.184.216.34".to_string()]);
        report.insert_pair("a.iana-servers.net.", "199.43.135.53", pair_result);

        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("a.iana-servers.net."));
        assert!(json.contains("199.43.135.53"));
        assert!(json.contains("93.184.216.34"));
    }

    #[test]
    fn empty_report_has_no_pairs() {
        assert!(AnalysisReport::new().is_empty());
    }
}
