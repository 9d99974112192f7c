//! Path composition for nested specification entries.

/// Append `segment` to `base` with exactly one `/` between them.
///
/// Leading and trailing slashes on either side are ignored, so `/a/` + `/b/`
/// and `/a` + `b` both give `/a/b`. An empty segment leaves `base` unchanged.
pub fn join_path(base: &str, segment: &str) -> String {
    let base = base.trim_end_matches('/');
    let segment = segment.trim_matches('/');

    match (base.is_empty(), segment.is_empty()) {
        (true, true) => "/".to_string(),
        (false, true) => base.to_string(),
        (true, false) => format!("/{segment}"),
        (false, false) => format!("{base}/{segment}"),
    }
}

/// Normalize a base path: leading slash, no trailing slash (except the root).
pub fn normalize(path: &str) -> String {
    join_path("/", path)
}
