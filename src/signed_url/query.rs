//! Splitting targets into origin, path and query parameters.

use crate::InvalidArgument;

pub(crate) const EXPIRES_PARAM: &str = "expires";
pub(crate) const SIGNATURE_PARAM: &str = "signature";

/// A target or signed url reduced to the parts that are signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedTarget<'a> {
    path: &'a str,
    params: Vec<&'a str>,
}

impl<'a> ParsedTarget<'a> {
    /// Parses `/path?query` or `http(s)://host/path?query`. Scheme and host
    /// are dropped.
    pub(crate) fn parse(target: &'a str) -> Result<Self, InvalidArgument> {
        if target.is_empty() {
            return Err(InvalidArgument::new("target must not be empty"));
        }
        if let Some(bad) = target.chars().find(|&c| !is_url_safe(c)) {
            return Err(InvalidArgument::new(format!(
                "target contains the disallowed character {bad:?}"
            )));
        }

        let path_and_query = strip_origin(target).ok_or_else(|| {
            InvalidArgument::new(format!(
                "target must start with \"/\" or \"http(s)://host\", got \"{target}\""
            ))
        })?;

        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };

        Ok(Self {
            path,
            params: query.split('&').filter(|p| !p.is_empty()).collect(),
        })
    }

    pub(crate) fn has_param(&self, name: &str) -> bool {
        self.params.iter().any(|param| param_name(param) == name)
    }

    /// Removes every occurrence of `name` and returns the raw values.
    pub(crate) fn take_param(&mut self, name: &str) -> Vec<&'a str> {
        let mut values = Vec::new();
        self.params.retain(|&param| match param.split_once('=') {
            Some((key, value)) if key == name => {
                values.push(value);
                false
            }
            None if param == name => {
                values.push("");
                false
            }
            _ => true,
        });
        values
    }

    /// The canonical form covered by the signature: path (at least `/`)
    /// followed by the non-empty parameters in their original order.
    pub(crate) fn path_and_query(&self) -> String {
        let path = if self.path.is_empty() { "/" } else { self.path };
        if self.params.is_empty() {
            path.to_owned()
        } else {
            format!("{path}?{}", self.params.join("&"))
        }
    }
}

/// RFC 3986 unreserved and reserved characters plus `%`, without the
/// fragment delimiter `#`.
fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?[]@!$&'()*+,;=%".contains(c)
}

fn param_name(param: &str) -> &str {
    param.split_once('=').map_or(param, |(name, _)| name)
}

/// Returns everything after `scheme://host`, or the input itself for a
/// host-relative path.
fn strip_origin(target: &str) -> Option<&str> {
    if target.starts_with('/') {
        return Some(target);
    }

    let rest = target
        .strip_prefix("https://")
        .or_else(|| target.strip_prefix("http://"))?;
    let host_end = rest.find(['/', '?']).unwrap_or(rest.len());
    if host_end == 0 {
        return None;
    }
    Some(&rest[host_end..])
}
