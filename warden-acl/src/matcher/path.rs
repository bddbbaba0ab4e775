///! Secret-variable path matcher
///!
///! Selects the path rule pattern that applies to a concrete slash-delimited
///! path: exact match, closest glob by length difference, or the wildcard-all
///! pattern as a last resort.

use warden_common::policy::WILDCARD_GLOB;

/// Select the best-matching pattern for a target path
///
/// Never returns nothing: when no candidate matches structurally the
/// wildcard-all pattern `*` is resolved instead, and capability lookup
/// against an absent catch-all rule yields deny downstream.
pub fn select_best_path<'a>(candidate_patterns: &[&'a str], target: &str) -> &'a str {
    if let Some(exact) = candidate_patterns.iter().copied().find(|p| *p == target) {
        return exact;
    }

    let mut matching: Vec<&'a str> = candidate_patterns
        .iter()
        .copied()
        .filter(|pattern| does_match_pattern(pattern, target))
        .collect();

    if matching.is_empty() {
        return WILDCARD_GLOB;
    }

    // Stable sort keeps candidate order for equal scores, so the tie-break
    // below sees candidates in their declaration order.
    matching.sort_by_key(|pattern| compute_length_diff(pattern, target));

    if matching.len() > 1
        && compute_length_diff(matching[0], target) == compute_length_diff(matching[1], target)
        && matching[0].starts_with('*')
    {
        // A pattern anchored at the start is more specific than one with a
        // leading wildcard.
        return matching[1];
    }

    matching[0]
}

/// Path-boundary-aware glob test
///
/// Splits the pattern on `*` and walks the path left to right: the first
/// segment is anchored unless the pattern has a leading glob, later segments
/// must appear in order, and the last segment must be a suffix unless the
/// pattern has a trailing glob.
pub fn does_match_pattern(pattern: &str, path: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == path;
    }
    if pattern == WILDCARD_GLOB {
        return true;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let has_leading_glob = pattern.starts_with('*');
    let has_trailing_glob = pattern.ends_with('*');
    let last_part = parts[parts.len() - 1];

    let mut remaining = path;
    for (i, part) in parts.iter().enumerate() {
        match remaining.find(part) {
            Some(index) => {
                if i == 0 && !has_leading_glob && index != 0 {
                    return false;
                }
                remaining = &remaining[index + part.len()..];
            }
            None => return false,
        }
    }

    has_trailing_glob || path.ends_with(last_part)
}

/// Length-difference specificity score, smaller is more specific
///
/// Each `*` counts toward closeness since it absorbs a variable number of
/// characters. A heuristic proxy for specificity, not a longest-prefix
/// algorithm; ties beyond the leading-wildcard rule keep declaration order.
pub fn compute_length_diff(pattern: &str, path: &str) -> isize {
    let glob_count = pattern.matches('*').count() as isize;
    path.len() as isize - pattern.len() as isize + glob_count
}
