//! Href classification and joining.
//!
//! Only two cases are handled: hrefs that are already absolute (a URL with
//! a scheme, or an absolute path) and relative hrefs joined onto a local
//! base. Joining onto a remote base URL is left unsupported and reported as
//! [`UsageError::RemoteJoin`].

use std::path::{Component, Path, PathBuf};

use stac_types::{StacResult, UsageError};
use url::Url;

/// Parse `href` as a URL with a real scheme.
///
/// Single-letter schemes are treated as Windows drive letters, not URLs.
pub fn parse_url(href: &str) -> Option<Url> {
    Url::parse(href).ok().filter(|url| url.scheme().len() > 1)
}

/// Returns `true` if `href` carries a URL scheme.
pub fn has_scheme(href: &str) -> bool {
    parse_url(href).is_some()
}

/// Returns `true` if `href` can be used without a base.
pub fn is_absolute_href(href: &str) -> bool {
    has_scheme(href) || Path::new(href).is_absolute()
}

/// Resolve `href` against `base`.
///
/// - URLs are returned unchanged.
/// - Absolute paths are normalized and returned.
/// - Relative hrefs are joined onto the directory of `base` (or onto `base`
///   itself when it ends with `/`) and normalized.
pub fn make_absolute_href(href: &str, base: Option<&str>) -> StacResult<String> {
    if has_scheme(href) {
        return Ok(href.to_string());
    }
    if Path::new(href).is_absolute() {
        return Ok(path_to_href(&normalize(Path::new(href))));
    }
    let Some(base) = base else {
        return Err(UsageError::NoBaseHref {
            href: href.to_string(),
        }
        .into());
    };
    let base_path = match parse_url(base) {
        Some(url) if url.scheme() == "file" => {
            url.to_file_path().map_err(|()| UsageError::RemoteJoin {
                href: href.to_string(),
                base: base.to_string(),
            })?
        }
        Some(_) => {
            return Err(UsageError::RemoteJoin {
                href: href.to_string(),
                base: base.to_string(),
            }
            .into())
        }
        None => PathBuf::from(base),
    };
    let directory = if base.ends_with('/') {
        base_path.as_path()
    } else {
        base_path.parent().unwrap_or_else(|| Path::new(""))
    };
    Ok(path_to_href(&normalize(&directory.join(href))))
}

/// The directory part of an href: everything before the last `/`.
///
/// An href without a `/` lives in the current directory, `.`.
pub fn href_directory(href: &str) -> &str {
    match href.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((directory, _)) => directory,
        None => ".",
    }
}

/// Convert a local href (plain path or `file://` URL) to a filesystem path.
pub fn href_to_path(href: &str) -> Option<PathBuf> {
    match parse_url(href) {
        Some(url) if url.scheme() == "file" => url.to_file_path().ok(),
        Some(_) => None,
        None => Some(PathBuf::from(href)),
    }
}

fn path_to_href(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Lexically resolve `.` and `..` components without touching the
/// filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}
