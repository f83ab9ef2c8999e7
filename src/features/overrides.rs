//! Header/query override parsing — pure functions, unit-tested in isolation.

/// Parse a single override value per §4.2's value table:
/// `{true|1|yes|on|enabled} -> true`, `{false|0|no|off|disabled} -> false`,
/// anything else -> true.
pub fn parse_bool_token(raw: &str) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "false" | "0" | "no" | "off" | "disabled" => false,
        _ => true,
    }
}

/// Parse one compact-syntax item: `name`, `name=value`, `!name`, or `-name`.
/// Returns `(feature_id, enabled)`.
pub fn parse_compact_item(item: &str) -> Option<(String, bool)> {
    let item = item.trim();
    if item.is_empty() {
        return None;
    }
    if let Some(rest) = item.strip_prefix('!').or_else(|| item.strip_prefix('-')) {
        let name = rest.trim();
        if name.is_empty() {
            return None;
        }
        return Some((name.to_lowercase(), false));
    }
    if let Some((name, value)) = item.split_once('=') {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        return Some((name.to_lowercase(), parse_bool_token(value)));
    }
    Some((item.to_lowercase(), true))
}

/// Parse the compact `X-Features`/`features=` syntax: a comma-separated list
/// of items, each parsed by `parse_compact_item`.
pub fn parse_compact(raw: &str) -> Vec<(String, bool)> {
    raw.split(',').filter_map(parse_compact_item).collect()
}
