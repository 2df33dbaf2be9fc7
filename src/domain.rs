use crate::errors::DiagnosticErr;
use crate::shared::dns::Name;

/// Parses a domain as given on the CLI or in a batch file - lowercase,
/// no trailing dot, at least a second-level name - into the internal
/// absolute [`Name`] form the wire codec expects.
pub fn parse_external_domain(input: &str) -> Result<Name, DiagnosticErr> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DiagnosticErr::InvalidDomain("empty domain".to_string()));
    }
    let lower = trimmed.to_ascii_lowercase();
    let absolute = if lower.ends_with('.') { lower } else { format!("{}.", lower) };

    let name = Name::from_string(&absolute).map_err(|e| DiagnosticErr::InvalidDomain(format!("{:?}", e)))?;
    if name.label_count() < 2 {
        return Err(DiagnosticErr::InvalidDomain(format!(
            "'{}' must have at least a second-level label",
            input
        )));
    }
    Ok(name)
}

/// Renders a [`Name`] back to the external, no-trailing-dot form used
/// in reports and CLI output.
pub fn to_external_form(name: &Name) -> String {
    let s = name.to_string();
    s.strip_suffix('.').unwrap_or(&s).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_domain() {
        let name = parse_external_domain("Example.com").unwrap();
        assert_eq!(name.to_string(), "example.com.");
    }

    #[test]
    fn accepts_already_absolute_domain() {
        let name = parse_external_domain("example.com.").unwrap();
        assert_eq!(name.to_string(), "example.com.");
    }

    #[test]
    fn rejects_bare_tld() {
        assert!(parse_external_domain("com").is_err());
    }

    #[test]
    fn rejects_empty_input() {
        assert!(parse_external_domain("   ").is_err());
    }

    #[test]
    fn round_trips_to_external_form() {
        let name = parse_external_domain("example.com").unwrap();
        assert_eq!(to_external_form(&name), "example.com");
    }
}
