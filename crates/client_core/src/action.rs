//! Binds declared endpoints and links to the runtime file context.
//!
//! Relative templates are appended to the server base url so an installation living
//! under a sub-path (`https://host/nextcloud`) keeps its prefix. Placeholder values
//! end up percent-encoded as a single path segment, or form-encoded in the query.
//! Literal path text is left the way the server wrote it.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde_json::{Map, Value};
use shared::{
    domain::{FileContext, Placeholder},
    protocol::{Endpoint, Method},
};
use url::Url;

use crate::{error::ResolveError, types::ResolvedRequest};

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub fn resolve_endpoint(
    base: &Url,
    endpoint: &Endpoint,
    ctx: &FileContext,
) -> Result<ResolvedRequest, ResolveError> {
    let mut url = resolve_url(base, &endpoint.url, ctx)?;

    let mut params = BTreeMap::new();
    for (name, value) in &endpoint.params {
        params.insert(name.clone(), substitute(value, ctx)?);
    }

    let body = match endpoint.method {
        Method::Get => {
            if !params.is_empty() {
                let mut query = url.query_pairs_mut();
                for (name, value) in &params {
                    query.append_pair(name, value);
                }
            }
            None
        }
        Method::Post => {
            let object: Map<String, Value> = params
                .into_iter()
                .map(|(name, value)| (name, Value::String(value)))
                .collect();
            Some(Value::Object(object))
        }
    };

    Ok(ResolvedRequest {
        method: endpoint.method,
        url,
        body,
    })
}

/// Resolves the target of a link element. Non-http absolute urls (`mailto:` and the like)
/// are passed through untouched apart from placeholder substitution.
pub fn resolve_link(base: &Url, link: &str, ctx: &FileContext) -> Result<Url, ResolveError> {
    if let Ok(parsed) = Url::parse(link.trim()) {
        if !matches!(parsed.scheme(), "http" | "https") {
            let substituted = substitute(link.trim(), ctx)?;
            return Url::parse(&substituted).map_err(|err| ResolveError::invalid_url(link, err));
        }
    }
    resolve_url(base, link, ctx)
}

pub fn resolve_url(base: &Url, template: &str, ctx: &FileContext) -> Result<Url, ResolveError> {
    let template = template.trim();
    let without_fragment = template.split('#').next().unwrap_or_default();
    let (path_part, query_part) = match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    };

    let (mut url, path) = match absolute_origin_len(path_part) {
        Some(origin_len) => {
            let origin = &path_part[..origin_len];
            let url = Url::parse(origin).map_err(|err| ResolveError::invalid_url(template, err))?;
            (url, &path_part[origin_len..])
        }
        None => (base.clone(), path_part),
    };
    url.set_query(None);
    url.set_fragment(None);

    if url.cannot_be_a_base() {
        return Err(ResolveError::invalid_url(template, "url cannot carry a path"));
    }
    let mut encoded_path = url.path().trim_end_matches('/').to_string();
    for segment in path.split('/').filter(|segment| !segment.is_empty()) {
        encoded_path.push('/');
        encoded_path.push_str(&path_segment(segment, template, ctx)?);
    }
    if encoded_path.is_empty() || (path.len() > 1 && path.ends_with('/')) {
        encoded_path.push('/');
    }
    url.set_path(&encoded_path);

    if let Some(query) = query_part.filter(|query| !query.is_empty()) {
        let mut pairs = Vec::new();
        for (name, value) in url::form_urlencoded::parse(query.as_bytes()) {
            pairs.push((substitute(&name, ctx)?, substitute(&value, ctx)?));
        }
        if !pairs.is_empty() {
            let mut serializer = url.query_pairs_mut();
            for (name, value) in &pairs {
                serializer.append_pair(name, value);
            }
        }
    }

    Ok(url)
}

/// Replaces `{fileId}` / `{filePath}` with values from `ctx`. Unknown `{...}` tokens are
/// kept verbatim; a known placeholder without a value is an error.
pub fn substitute(template: &str, ctx: &FileContext) -> Result<String, ResolveError> {
    substitute_with(template, ctx, |out, value| out.push_str(value))
}

/// Literal template text is kept as written, `%XX` escapes included. Only substituted
/// values are encoded, and a value that would form a `.` or `..` segment is refused.
fn path_segment(
    segment: &str,
    template: &str,
    ctx: &FileContext,
) -> Result<String, ResolveError> {
    let encoded = substitute_with(segment, ctx, |out, value| {
        out.extend(utf8_percent_encode(value, PATH_SEGMENT));
    })?;
    if encoded != segment && matches!(encoded.as_str(), "." | "..") {
        return Err(ResolveError::invalid_url(
            template,
            format!("placeholder value `{encoded}` is a dot segment"),
        ));
    }
    Ok(encoded)
}

fn substitute_with(
    template: &str,
    ctx: &FileContext,
    mut push_value: impl FnMut(&mut String, &str),
) -> Result<String, ResolveError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = &after[..end];
        if name.contains('{') {
            out.push('{');
            rest = after;
            continue;
        }

        match Placeholder::from_name(name) {
            Some(placeholder) => {
                let value = ctx
                    .value_for(placeholder)
                    .ok_or_else(|| ResolveError::MissingContext(name.to_string()))?;
                push_value(&mut out, &value);
            }
            None => {
                tracing::debug!(placeholder = name, "leaving unknown placeholder untouched");
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

fn absolute_origin_len(path_part: &str) -> Option<usize> {
    let lower = path_part.get(..8).unwrap_or(path_part).to_ascii_lowercase();
    let scheme_len = if lower.starts_with("https://") {
        8
    } else if lower.starts_with("http://") {
        7
    } else {
        return None;
    };
    let authority = &path_part[scheme_len..];
    Some(scheme_len + authority.find('/').unwrap_or(authority.len()))
}

#[cfg(test)]
#[path = "tests/action_tests.rs"]
mod tests;
