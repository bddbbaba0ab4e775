///! Namespace name matcher
///!
///! Selects the single namespace rule name that applies to an active
///! namespace: exact match, closest glob, or the default namespace.

use regex::Regex;
use warden_common::policy::DEFAULT_NAMESPACE;

/// Select the best-matching namespace name for a target namespace
///
/// Precedence: an exact match wins unconditionally; otherwise the glob
/// candidate with the smallest character difference to the target wins;
/// otherwise `default` when present. Returns None when nothing applies,
/// which callers must treat as deny.
pub fn select_best_namespace<'a>(candidate_names: &[&'a str], target: &str) -> Option<&'a str> {
    if let Some(exact) = candidate_names.iter().copied().find(|name| *name == target) {
        return Some(exact);
    }

    let mut best: Option<(&'a str, isize)> = None;
    for name in candidate_names.iter().copied().filter(|name| name.contains('*')) {
        let difference = target.len() as isize - name.len() as isize;
        let replaces = match best {
            Some((_, best_difference)) => difference < best_difference,
            None => true,
        };
        // Only candidates that would replace the running best are tested.
        if replaces && glob_matches(name, target) {
            best = Some((name, difference));
        }
    }
    if let Some((name, _)) = best {
        return Some(name);
    }

    candidate_names
        .iter()
        .copied()
        .find(|name| *name == DEFAULT_NAMESPACE)
}

/// Literal-or-glob test of a single rule name against a target namespace
pub fn namespace_matches(name: &str, target: &str) -> bool {
    name == target || (name.contains('*') && glob_matches(name, target))
}

/// Unanchored glob test: every `*` matches any run of characters
fn glob_matches(pattern: &str, target: &str) -> bool {
    let expression = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    match Regex::new(&expression) {
        Ok(re) => re.is_match(target),
        // Fail closed on an uncompilable pattern.
        Err(_) => false,
    }
}
