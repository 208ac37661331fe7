//! Logical path resolution against a backend profile.
//!
//! Maps a logical request path onto a profile's concrete URL. Matching is
//! longest-prefix over the fixed resource table, at segment boundaries
//! only, so overlapping prefixes resolve the same way regardless of table
//! order. The matched prefix is swapped for the profile's override (when
//! one is configured) and the remainder of the path, query string
//! included, rides along unchanged.

use crate::profile::types::{BackendProfile, Resource};

/// Header carrying the client platform marker on every request.
pub const PLATFORM_HEADER: &str = "x-souq-platform";

/// Match `path` against the resource table.
///
/// Returns the matched resource and the remainder after its default
/// prefix. A prefix only matches at a `/` boundary: `/stores/42` matches
/// the stores resource, `/storesx` matches nothing.
pub fn match_resource(path: &str) -> Option<(Resource, &str)> {
    let mut best: Option<(Resource, &str)> = None;
    for resource in Resource::all() {
        let prefix = resource.default_prefix();
        if let Some(rest) = path.strip_prefix(prefix) {
            if rest.is_empty() || rest.starts_with('/') {
                let longer = best
                    .map(|(current, _)| prefix.len() > current.default_prefix().len())
                    .unwrap_or(true);
                if longer {
                    best = Some((*resource, rest));
                }
            }
        }
    }
    best
}

/// Compute the concrete URL for `path` against `profile`.
pub fn resolve_url(profile: &BackendProfile, path: &str) -> String {
    let (path_part, query) = split_query(path);
    let base = profile.base_url.trim_end_matches('/');

    match match_resource(path_part) {
        Some((resource, rest)) => {
            let prefix = profile
                .endpoints
                .get(&resource)
                .map(String::as_str)
                .unwrap_or_else(|| resource.default_prefix());
            format!("{base}{prefix}{rest}{query}")
        }
        None => format!("{base}{path_part}{query}"),
    }
}

/// Append `path` verbatim to a base URL, without resource resolution.
/// Used for the local default and for health probes.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Split off the query string, keeping its leading `?`.
fn split_query(path: &str) -> (&str, &str) {
    match path.find('?') {
        Some(idx) => path.split_at(idx),
        None => (path, ""),
    }
}
