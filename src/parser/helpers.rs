//! Helper functions for cross-file references (`file#id` hrefs).

/// Separator between the referenced file and the referenced entity's name.
pub const REFERENCE_ARROW: char = '→';

/// Split an href like `"default.repository#_x1"` into `(file, id)`.
///
/// Anything other than exactly two non-empty parts is rejected.
pub fn parse_href(href: &str) -> Option<(&str, &str)> {
    let mut parts = href.split('#');
    let (Some(file), Some(id), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if file.is_empty() || id.is_empty() {
        return None;
    }
    Some((file, id))
}

/// Append `file→target` to the referring entity's current name.
///
/// A nameless referrer starts from `unnamed_prefix` (or nothing). The result
/// never carries trailing whitespace.
pub fn compose_reference_name(
    current: Option<&str>,
    unnamed_prefix: Option<&str>,
    file: &str,
    target: &str,
) -> String {
    let mut name = match current {
        Some(current) if !current.is_empty() => {
            let mut s = current.trim_end().to_string();
            s.push(' ');
            s
        }
        _ => unnamed_prefix.unwrap_or_default().to_string(),
    };
    name.push_str(file);
    name.push(REFERENCE_ARROW);
    name.push_str(target);
    name.push(' ');
    name.truncate(name.trim_end().len());
    name
}
