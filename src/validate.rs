//! Admission check for incoming links. Purely syntactic: no network access
//! and the query string is never inspected.

use std::collections::BTreeSet;

use url::Url;

/// `true` iff the host, exactly as written in the URL's authority, is one of
/// `allowed_hosts` (case-sensitive) and the path contains a slash followed by
/// at least one non-slash character. Unparsable input is not recognized.
pub fn is_recognized_url(url: &str, allowed_hosts: &BTreeSet<String>) -> bool {
    let Some(host) = raw_host(url) else {
        return false;
    };
    if !allowed_hosts.contains(host) {
        return false;
    }
    Url::parse(url)
        .map(|parsed| has_path_segment(parsed.path()))
        .unwrap_or(false)
}

/// [`is_recognized_url`] for an already parsed URL. Parsing lowercases the
/// host of `http`/`https` URLs, so the comparison sees the normalized host.
pub fn is_recognized_link(url: &Url, allowed_hosts: &BTreeSet<String>) -> bool {
    is_recognized_url(url.as_str(), allowed_hosts)
}

/// The host as written between `scheme://` and the path, without userinfo
/// or port.
fn raw_host(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("://")?;
    let authority = rest
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host_port)| host_port);

    let host = if host_port.starts_with('[') {
        host_port
            .find(']')
            .map_or(host_port, |end| &host_port[..=end])
    } else {
        host_port
            .split_once(':')
            .map_or(host_port, |(host, _)| host)
    };
    (!host.is_empty()).then_some(host)
}

fn has_path_segment(path: &str) -> bool {
    path.split('/').skip(1).any(|segment| !segment.is_empty())
}
