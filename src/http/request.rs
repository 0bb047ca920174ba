//! Request inspection.
//!
//! # Responsibilities
//! - Name the request ID header
//! - Split the Host header into hostname and port
//! - Work out the effective port of a request
//!
//! # Design Decisions
//! - The effective port is the port the request arrived on: a trusted
//!   `X-Forwarded-Port`, else the listener port. A Host header port is dropped
//! - Hostnames are lowercased and lose a trailing dot
//! - IPv6 literals keep their brackets
//! - A malformed Host header means "no host", never an error response

use axum::http::{HeaderMap, HeaderName, Uri, header};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
pub const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");

/// Listener port assumed when the bind address names none.
pub const DEFAULT_REQUEST_PORT: u16 = 80;

/// Hostname and effective port of an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHost {
    pub hostname: String,
    pub port: u16,
}

/// Split `host[:port]` into a lowercased domain and an optional port.
///
/// Returns `None` for an empty host or an unparsable port.
pub fn split_domain_port(host: &str) -> Option<(String, Option<u16>)> {
    let host = host.trim().to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }

    let (domain, port) = if host.ends_with(']') {
        (host.as_str(), None)
    } else {
        match host.rsplit_once(':') {
            // a bare IPv6 address without brackets is not a valid Host
            Some((domain, _)) if domain.contains(':') && !domain.starts_with('[') => return None,
            Some((domain, port)) => (domain, Some(port.parse::<u16>().ok()?)),
            None => (host.as_str(), None),
        }
    };

    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return None;
    }
    Some((domain.to_string(), port))
}

/// Extract the request host from the Host header (or the URI authority).
///
/// `listener_port` is the local port of the accepting listener.
pub fn request_host(
    headers: &HeaderMap,
    uri: &Uri,
    trust_forwarded_port: bool,
    listener_port: u16,
) -> Option<RequestHost> {
    let raw = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        .or_else(|| uri.authority().map(|a| a.as_str().to_string()))?;

    let (hostname, _) = split_domain_port(&raw)?;

    let forwarded_port = if trust_forwarded_port {
        headers
            .get(X_FORWARDED_PORT)
            .and_then(|h| h.to_str().ok())
            .and_then(|p| p.trim().parse::<u16>().ok())
    } else {
        None
    };

    Some(RequestHost {
        hostname,
        port: forwarded_port.unwrap_or(listener_port),
    })
}

/// The request ID set by the request ID layer, or "unknown".
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_split_domain_port() {
        assert_eq!(
            split_domain_port("Example.COM"),
            Some(("example.com".to_string(), None))
        );
        assert_eq!(
            split_domain_port("example.com:8000"),
            Some(("example.com".to_string(), Some(8000)))
        );
        assert_eq!(
            split_domain_port("example.com."),
            Some(("example.com".to_string(), None))
        );
        assert_eq!(
            split_domain_port("[::1]:8000"),
            Some(("[::1]".to_string(), Some(8000)))
        );
        assert_eq!(split_domain_port("[::1]"), Some(("[::1]".to_string(), None)));
        assert_eq!(split_domain_port("::1"), None);
        assert_eq!(split_domain_port("example.com:http"), None);
        assert_eq!(split_domain_port(""), None);
    }

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_request_host() {
        let uri = Uri::from_static("/");
        let host = request_host(&headers(&[("host", "example.com")]), &uri, false, 8000).unwrap();
        assert_eq!(host, RequestHost { hostname: "example.com".into(), port: 8000 });

        assert!(request_host(&HeaderMap::new(), &uri, false, 80).is_none());
    }

    #[test]
    fn test_host_header_port_is_not_the_request_port() {
        let uri = Uri::from_static("/");
        let host = request_host(&headers(&[("host", "example.com:9999")]), &uri, false, 80).unwrap();
        assert_eq!(host, RequestHost { hostname: "example.com".into(), port: 80 });
    }

    #[test]
    fn test_forwarded_port_only_when_trusted() {
        let uri = Uri::from_static("/");
        let map = headers(&[("host", "example.com"), ("x-forwarded-port", "443")]);
        assert_eq!(request_host(&map, &uri, false, 80).unwrap().port, 80);
        assert_eq!(request_host(&map, &uri, true, 80).unwrap().port, 443);

        let garbage = headers(&[("host", "example.com"), ("x-forwarded-port", "https")]);
        assert_eq!(request_host(&garbage, &uri, true, 8000).unwrap().port, 8000);
    }

    #[test]
    fn test_authority_fallback() {
        let uri = Uri::from_static("http://Example.com:8080/path");
        let host = request_host(&HeaderMap::new(), &uri, false, 8080).unwrap();
        assert_eq!(host, RequestHost { hostname: "example.com".into(), port: 8080 });
    }
}
