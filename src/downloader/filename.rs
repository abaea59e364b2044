//! Filename recovery for downloaded resources
//!
//! Names come from the `Content-Disposition` header when it carries one and
//! from the final URL's last path segment otherwise. Only the last path
//! component of a recovered name is ever used.

use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Filename announced by a response, if one can be derived
pub(crate) fn identify_filename(response: &reqwest::Response) -> Option<String> {
    let announced = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_disposition_filename)
        .and_then(|name| sanitize(&name));

    announced.or_else(|| url_basename(response.url()))
}

/// Extract the filename from a raw `Content-Disposition` value
///
/// Handles `filename="quoted"`, `filename=token` and RFC 5987
/// `filename*=UTF-8''percent%20encoded`. `filename*` wins when both appear.
pub fn parse_content_disposition_filename(header_value: &str) -> Option<String> {
    let mut plain: Option<String> = None;

    for param in header_value.trim().split(';') {
        let Some((name, value)) = param.trim().split_once('=') else {
            continue;
        };
        let value = value.trim();

        match name.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                // charset'language'encoded
                if let Some((_, encoded)) = value.rsplit_once('\'')
                    && let Ok(decoded) = urlencoding::decode(encoded)
                    && !decoded.is_empty()
                {
                    return Some(decoded.into_owned());
                }
            }
            "filename" => {
                let unquoted = match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                    Some(inner) => unescape_quoted(inner),
                    None => value.to_string(),
                };
                if !unquoted.is_empty() {
                    plain = Some(unquoted);
                }
            }
            _ => {}
        }
    }

    plain
}

/// Undo backslash escaping inside a quoted-string
fn unescape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && (next == '"' || next == '\\')
        {
            out.push(next);
            chars.next();
        } else {
            out.push(c);
        }
    }
    out
}

/// Last path segment of a URL, percent-decoded
fn url_basename(url: &url::Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let decoded = urlencoding::decode(segment).ok()?;
    sanitize(&decoded)
}

/// Reduce a name to its final path component, rejecting names that address no file
fn sanitize(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next()?.trim();
    match last {
        "" | "." | ".." => None,
        _ => Some(last.to_string()),
    }
}

/// Make every name in the list unique
///
/// Repeated names get `-<n>` inserted before the extension, counting from 1
/// per original name: `["a.pdf", "a.pdf", "a.pdf"]` becomes
/// `["a.pdf", "a-1.pdf", "a-2.pdf"]`. Candidates already in the list are
/// skipped.
pub fn unify_filenames(filenames: &mut [String]) {
    let mut taken: HashSet<String> = HashSet::with_capacity(filenames.len());
    let mut hits: HashMap<String, usize> = HashMap::new();

    for name in filenames.iter_mut() {
        if taken.insert(name.clone()) {
            continue;
        }

        let (stem, extension) = split_extension(name);
        let hit = hits.entry(name.clone()).or_insert(0);
        let renamed = loop {
            *hit += 1;
            let candidate = format!("{}-{}{}", stem, hit, extension);
            if !taken.contains(&candidate) {
                break candidate;
            }
        };

        taken.insert(renamed.clone());
        *name = renamed;
    }
}

/// `("report", ".pdf")` for `report.pdf`; dotfiles have no extension
fn split_extension(name: &str) -> (String, String) {
    let path = Path::new(name);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => (
            stem.to_string_lossy().into_owned(),
            format!(".{}", ext.to_string_lossy()),
        ),
        _ => (name.to_string(), String::new()),
    }
}
