//! Remote endpoint descriptors.
//!
//! # Responsibilities
//! - Split and join the compound `host|label` descriptor form
//! - Parse `tcp://` / `ssh://` host strings into typed endpoints
//! - Validate host and label syntax before anything is persisted
//!
//! # Design Decisions
//! - Every component that separates host from label goes through
//!   [`split_label`]; nothing else re-implements the splitting
//! - Pure string work: no network or filesystem access, same input
//!   always yields the same classification

use url::Url;

/// Connection scheme of a remote endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    /// Direct TCP to the remote Docker API. Requires an explicit port.
    Tcp,
    /// SSH to the remote host. Probed through a local tunnel, never
    /// dialed directly.
    Ssh,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Tcp => "tcp",
            Scheme::Ssh => "ssh",
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed remote endpoint.
///
/// `authority` is `host:port` for TCP and `host[:port]` for SSH. SSH
/// user info is dropped: the prober only ever dials the local tunnel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub scheme: Scheme,
    pub authority: String,
}

/// Error type for descriptor validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorError {
    /// Value does not parse as a URI at all.
    InvalidFormat,
    /// Scheme is neither `tcp` nor `ssh`.
    InvalidScheme,
    /// URI has no host component.
    MissingHost,
    /// TCP without a port, or an SSH port that does not parse.
    MissingPort(Scheme),
    /// Descriptor ends in `|` with nothing after it.
    EmptyLabel,
    /// Label contains the `|` separator.
    LabelSeparator,
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            DescriptorError::InvalidFormat => "invalid format",
            DescriptorError::InvalidScheme => "invalid scheme (tcp:// or ssh://)",
            DescriptorError::MissingHost => "missing host",
            DescriptorError::MissingPort(Scheme::Tcp) => "tcp requires host:port",
            DescriptorError::MissingPort(Scheme::Ssh) => "invalid ssh port",
            DescriptorError::EmptyLabel => "label cannot be empty",
            DescriptorError::LabelSeparator => "label cannot contain '|'",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for DescriptorError {}

/// Split a combined `host|label` descriptor on the first `|`.
///
/// Both sides are trimmed. A descriptor without `|` yields an empty
/// label.
pub fn split_label(descriptor: &str) -> (String, String) {
    match descriptor.split_once('|') {
        Some((host, label)) => (host.trim().to_string(), label.trim().to_string()),
        None => (descriptor.trim().to_string(), String::new()),
    }
}

/// Join host and label back into the combined descriptor form.
/// Inverse of [`split_label`] for inputs free of `|`.
pub fn join_label(host: &str, label: &str) -> String {
    if label.is_empty() {
        host.to_string()
    } else {
        format!("{}|{}", host, label)
    }
}

/// Parse a bare host value (label already split off) into a typed
/// endpoint. Empty input is the caller's business; here it is just
/// another unparseable string.
pub fn parse_endpoint(host: &str) -> Result<RemoteEndpoint, DescriptorError> {
    let url = Url::parse(host).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => DescriptorError::InvalidScheme,
        url::ParseError::EmptyHost => DescriptorError::MissingHost,
        url::ParseError::InvalidPort
            if host.get(..6).map_or(false, |p| p.eq_ignore_ascii_case("ssh://")) =>
        {
            DescriptorError::MissingPort(Scheme::Ssh)
        }
        _ => DescriptorError::InvalidFormat,
    })?;

    let scheme = match url.scheme() {
        "tcp" => Scheme::Tcp,
        "ssh" => Scheme::Ssh,
        _ => return Err(DescriptorError::InvalidScheme),
    };

    let host_part = url.host_str().unwrap_or("");
    if host_part.is_empty() {
        return Err(DescriptorError::MissingHost);
    }

    let authority = match url.port() {
        Some(port) => format!("{}:{}", host_part, port),
        None if scheme == Scheme::Tcp => {
            return Err(DescriptorError::MissingPort(Scheme::Tcp));
        }
        None => host_part.to_string(),
    };

    Ok(RemoteEndpoint { scheme, authority })
}

/// Validate a raw host value as submitted by the operator.
///
/// Empty means "unconfigured" and passes. A combined `host|label`
/// value is split first, except that a trailing `|` with nothing
/// after it is an explicitly empty label and is rejected.
pub fn validate_host(value: &str) -> Result<(), DescriptorError> {
    if value.is_empty() {
        return Ok(());
    }
    let base = if value.contains('|') {
        if value.ends_with('|') {
            return Err(DescriptorError::EmptyLabel);
        }
        split_label(value).0
    } else {
        value.to_string()
    };
    parse_endpoint(&base).map(|_| ())
}

/// Validate a display label. Empty is fine; the separator is not.
pub fn validate_label(value: &str) -> Result<(), DescriptorError> {
    if value.contains('|') {
        return Err(DescriptorError::LabelSeparator);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_with_port_is_valid() {
        assert_eq!(validate_host("tcp://192.168.1.5:2375"), Ok(()));
        let ep = parse_endpoint("tcp://192.168.1.5:2375").unwrap();
        assert_eq!(ep.scheme, Scheme::Tcp);
        assert_eq!(ep.authority, "192.168.1.5:2375");
    }

    #[test]
    fn tcp_without_port_is_missing_port() {
        assert_eq!(
            validate_host("tcp://192.168.1.5"),
            Err(DescriptorError::MissingPort(Scheme::Tcp))
        );
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(validate_host("TCP://host:2375"), Ok(()));
    }

    #[test]
    fn foreign_scheme_is_rejected() {
        assert_eq!(
            validate_host("http://host:2375"),
            Err(DescriptorError::InvalidScheme)
        );
    }

    #[test]
    fn scheme_less_value_is_rejected() {
        assert_eq!(
            validate_host("192.168.1.5:2375"),
            Err(DescriptorError::InvalidScheme)
        );
    }

    #[test]
    fn missing_host_is_detected() {
        assert_eq!(validate_host("tcp://"), Err(DescriptorError::MissingHost));
    }

    #[test]
    fn empty_host_value_means_unconfigured() {
        assert_eq!(validate_host(""), Ok(()));
    }

    #[test]
    fn ssh_variants_parse() {
        let bare = parse_endpoint("ssh://deploy@prod.internal").unwrap();
        assert_eq!(bare.scheme, Scheme::Ssh);
        assert_eq!(bare.authority, "prod.internal");

        let with_port = parse_endpoint("ssh://deploy@prod.internal:2222").unwrap();
        assert_eq!(with_port.authority, "prod.internal:2222");
    }

    #[test]
    fn ssh_port_out_of_range_is_invalid_ssh_port() {
        assert_eq!(
            validate_host("ssh://host:99999"),
            Err(DescriptorError::MissingPort(Scheme::Ssh))
        );
    }

    #[test]
    fn trailing_separator_is_an_empty_label() {
        assert_eq!(
            validate_host("tcp://h:1|"),
            Err(DescriptorError::EmptyLabel)
        );
    }

    #[test]
    fn combined_descriptor_validates_its_host_part() {
        assert_eq!(validate_host("tcp://h:1|Production"), Ok(()));
        assert_eq!(
            validate_host("h:1|Production"),
            Err(DescriptorError::InvalidScheme)
        );
    }

    #[test]
    fn split_takes_first_separator_and_trims() {
        assert_eq!(
            split_label(" tcp://h:1 | east | west "),
            ("tcp://h:1".to_string(), "east | west".to_string())
        );
        assert_eq!(
            split_label("tcp://h:1"),
            ("tcp://h:1".to_string(), String::new())
        );
    }

    #[test]
    fn split_join_round_trip() {
        let (host, label) = split_label(&join_label("ssh://user@host", "Prod box"));
        assert_eq!(host, "ssh://user@host");
        assert_eq!(label, "Prod box");

        assert_eq!(join_label("tcp://h:1", ""), "tcp://h:1");
    }

    #[test]
    fn label_with_separator_is_rejected() {
        assert_eq!(validate_label("a|b"), Err(DescriptorError::LabelSeparator));
        assert_eq!(validate_label(""), Ok(()));
        assert_eq!(validate_label("Production"), Ok(()));
    }

    #[test]
    fn error_messages_are_operator_facing() {
        assert_eq!(DescriptorError::InvalidFormat.to_string(), "invalid format");
        assert_eq!(
            DescriptorError::InvalidScheme.to_string(),
            "invalid scheme (tcp:// or ssh://)"
        );
        assert_eq!(DescriptorError::MissingHost.to_string(), "missing host");
        assert_eq!(
            DescriptorError::MissingPort(Scheme::Tcp).to_string(),
            "tcp requires host:port"
        );
        assert_eq!(
            DescriptorError::MissingPort(Scheme::Ssh).to_string(),
            "invalid ssh port"
        );
        assert_eq!(
            DescriptorError::EmptyLabel.to_string(),
            "label cannot be empty"
        );
        assert_eq!(
            DescriptorError::LabelSeparator.to_string(),
            "label cannot contain '|'"
        );
    }
}
