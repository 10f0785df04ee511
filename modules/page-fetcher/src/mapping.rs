// Static hostname -> IP[:port] substitution.
//
// Built once from a `domain:ip[:port]` list and never mutated afterwards, so a
// single table can be shared across every in-flight fetch.

use std::collections::HashMap;
use std::convert::Infallible;
use std::env;
use std::fmt;
use std::str::FromStr;

use url::Url;

/// Environment variable holding the mapping table.
pub const DOMAIN_MAPPINGS_ENV: &str = "DOMAIN_MAPPINGS";

/// Target address for one mapped hostname. Values are stored exactly as
/// configured; nothing checks that `ip` or `port` are well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostMapping {
    pub ip: Option<String>,
    pub port: Option<String>,
}

impl HostMapping {
    /// `ip` or `ip:port`. An empty port is treated as absent.
    pub fn authority(&self) -> String {
        let ip = self.ip.as_deref().unwrap_or_default();
        match self.port.as_deref().filter(|p| !p.is_empty()) {
            Some(port) => format!("{ip}:{port}"),
            None => ip.to_string(),
        }
    }
}

impl fmt::Display for HostMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainMappings {
    entries: HashMap<String, HostMapping>,
}

impl DomainMappings {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list of `domain:ip[:port]` entries.
    ///
    /// Empty entries are skipped. Missing segments become `None`; segments
    /// after the port are ignored. A later entry for the same domain replaces
    /// an earlier one.
    pub fn parse(config: &str) -> Self {
        let mut entries = HashMap::new();
        for entry in config.split(',').filter(|e| !e.is_empty()) {
            let mut parts = entry.split(':');
            let domain = parts.next().unwrap_or_default();
            let ip = parts.next().map(str::to_string);
            let port = parts.next().map(str::to_string);
            entries.insert(domain.to_string(), HostMapping { ip, port });
        }
        Self { entries }
    }

    /// Read the table from `DOMAIN_MAPPINGS`. Unset or empty means no mappings.
    pub fn from_env() -> Self {
        env::var(DOMAIN_MAPPINGS_ENV)
            .map(|value| Self::parse(&value))
            .unwrap_or_default()
    }

    /// Exact hostname match only.
    pub fn get(&self, host: &str) -> Option<&HostMapping> {
        self.entries.get(host)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite `url` against the table. Returns the mapping that matched and
    /// the replacement URL, or `None` when the host is not mapped.
    ///
    /// The replacement is always plain `http`; path and query are copied from
    /// the original. Fragments and credentials are dropped.
    pub fn remap(&self, url: &Url) -> Option<(&HostMapping, String)> {
        let mapping = self.get(url.host_str()?)?;
        let mut mapped = format!("http://{}{}", mapping.authority(), url.path());
        if let Some(query) = url.query().filter(|q| !q.is_empty()) {
            mapped.push('?');
            mapped.push_str(query);
        }
        Some((mapping, mapped))
    }
}

impl FromStr for DomainMappings {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remapped(config: &str, url: &str) -> Option<String> {
        let mappings = DomainMappings::parse(config);
        let url = Url::parse(url).unwrap();
        mappings.remap(&url).map(|(_, mapped)| mapped)
    }

    #[test]
    fn empty_config_has_no_entries() {
        let mappings = DomainMappings::parse("");
        assert!(mappings.is_empty());
        assert_eq!(remapped("", "http://a.example.com/foo"), None);
    }

    #[test]
    fn skips_empty_entries() {
        let mappings = DomainMappings::parse(",a.example.com:10.0.0.5,,");
        assert_eq!(mappings.len(), 1);
    }

    #[test]
    fn parses_ip_and_port() {
        let mappings = DomainMappings::parse("a.example.com:10.0.0.5:8080,b.example.com:10.0.0.6");
        assert_eq!(
            mappings.get("a.example.com"),
            Some(&HostMapping {
                ip: Some("10.0.0.5".into()),
                port: Some("8080".into()),
            })
        );
        assert_eq!(
            mappings.get("b.example.com"),
            Some(&HostMapping {
                ip: Some("10.0.0.6".into()),
                port: None,
            })
        );
    }

    #[test]
    fn entry_without_separator_keeps_missing_fields_empty() {
        let mappings = DomainMappings::parse("lonely.example.com");
        assert_eq!(
            mappings.get("lonely.example.com"),
            Some(&HostMapping { ip: None, port: None })
        );
    }

    #[test]
    fn malformed_values_are_stored_verbatim() {
        let mappings = DomainMappings::parse("a.example.com:not-an-ip:http");
        let mapping = mappings.get("a.example.com").unwrap();
        assert_eq!(mapping.authority(), "not-an-ip:http");
    }

    #[test]
    fn remaps_with_port() {
        assert_eq!(
            remapped("a.example.com:10.0.0.5:8080", "http://a.example.com/foo?x=1").as_deref(),
            Some("http://10.0.0.5:8080/foo?x=1")
        );
    }

    #[test]
    fn remaps_without_port() {
        assert_eq!(
            remapped("a.example.com:10.0.0.5", "http://a.example.com/foo?x=1").as_deref(),
            Some("http://10.0.0.5/foo?x=1")
        );
    }

    #[test]
    fn https_is_downgraded_to_http() {
        assert_eq!(
            remapped("secure.example.com:10.0.0.7:8443", "https://secure.example.com/a/b").as_deref(),
            Some("http://10.0.0.7:8443/a/b")
        );
    }

    #[test]
    fn empty_port_is_ignored() {
        assert_eq!(
            remapped("a.example.com:10.0.0.5:", "http://a.example.com/").as_deref(),
            Some("http://10.0.0.5/")
        );
    }

    #[test]
    fn bare_question_mark_and_fragment_are_dropped() {
        assert_eq!(
            remapped("a.example.com:10.0.0.5", "http://a.example.com/page?#top").as_deref(),
            Some("http://10.0.0.5/page")
        );
    }

    #[test]
    fn subdomains_do_not_match() {
        assert_eq!(remapped("example.com:10.0.0.5", "http://www.example.com/"), None);
    }

    #[test]
    fn from_str_matches_parse() {
        let parsed: DomainMappings = "a.example.com:10.0.0.5:8080".parse().unwrap();
        assert_eq!(parsed, DomainMappings::parse("a.example.com:10.0.0.5:8080"));
    }
}
