///! Policy evaluation
///!
///! Pure functions that combine the matchers with a token's policy
///! documents to answer capability checks. Policies are additive: one
///! permissive policy is enough even when another on the same token is
///! silent. Every lookup recomputes from the snapshot it is handed.

use crate::matcher::{namespace_matches, select_best_namespace, select_best_path};
use std::collections::BTreeSet;
use tracing::trace;
use warden_common::policy::{NamespaceRule, PathRule, PolicyDocument, WILDCARD_GLOB};

/// Check a capability for a namespace and, when given, a secret path
///
/// The single entry point used by the ability layer. Namespace-scoped
/// checks resolve one best namespace rule per policy document and union
/// the granted capabilities; path-scoped checks resolve the nearest
/// matching path rule across all documents.
pub fn can(
    policies: &[PolicyDocument],
    capability: &str,
    namespace: &str,
    path: Option<&str>,
) -> bool {
    let allowed = match path {
        Some(path) => variables_allow(policies, namespace, path, capability),
        None if namespace == WILDCARD_GLOB => {
            capabilities_for_all_namespaces(policies).contains(capability)
        }
        None => capabilities_for_namespace(policies, namespace).contains(capability),
    };
    trace!(capability, namespace, ?path, allowed, "acl check");
    allowed
}

/// The applicable namespace rule of each policy document
///
/// Per document, the best-matching rule name is chosen first and the first
/// rule carrying that name is taken; documents without a match contribute
/// nothing.
pub fn rules_for_namespace<'a>(
    policies: &'a [PolicyDocument],
    namespace: &str,
) -> Vec<&'a NamespaceRule> {
    let mut rules = Vec::new();
    for policy in policies {
        let names: Vec<&str> = policy
            .rules
            .namespaces
            .iter()
            .map(|rule| rule.name.as_str())
            .collect();
        if let Some(best) = select_best_namespace(&names, namespace) {
            if let Some(rule) = policy.rules.namespaces.iter().find(|rule| rule.name == best) {
                rules.push(rule);
            }
        }
    }
    rules
}

/// Union of capabilities granted on a namespace across all policies
pub fn capabilities_for_namespace<'a>(
    policies: &'a [PolicyDocument],
    namespace: &str,
) -> BTreeSet<&'a str> {
    rules_for_namespace(policies, namespace)
        .into_iter()
        .flat_map(|rule| rule.capabilities.iter().map(String::as_str))
        .collect()
}

/// Union of capabilities across every namespace rule of every policy
///
/// Used by the wildcard-namespace shortcut, where a check is satisfied by
/// any namespace granting the capability.
pub fn capabilities_for_all_namespaces<'a>(policies: &'a [PolicyDocument]) -> BTreeSet<&'a str> {
    policies
        .iter()
        .flat_map(|policy| policy.rules.namespaces.iter())
        .flat_map(|rule| rule.capabilities.iter().map(String::as_str))
        .collect()
}

/// OR across every rule whose name matches the target namespace
///
/// Unlike [`rules_for_namespace`] this considers all matching rules, not
/// one best rule per document: it answers "does any policy grant this
/// capability on this namespace".
pub fn namespace_allows(policies: &[PolicyDocument], namespace: &str, capability: &str) -> bool {
    policies
        .iter()
        .flat_map(|policy| policy.rules.namespaces.iter())
        .filter(|rule| namespace_matches(&rule.name, namespace))
        .any(|rule| rule.capabilities.iter().any(|granted| granted == capability))
}

/// The secret-path rules in scope for a target namespace
///
/// Keeps rules declared under the target namespace or under the wildcard
/// namespace; a wildcard target keeps everything, namespace-agnostic.
pub fn variable_path_rules<'a>(
    policies: &'a [PolicyDocument],
    namespace: &str,
) -> Vec<&'a PathRule> {
    policies
        .iter()
        .flat_map(|policy| policy.rules.namespaces.iter())
        .filter(|rule| {
            namespace == WILDCARD_GLOB || rule.name == namespace || rule.name == WILDCARD_GLOB
        })
        .filter_map(|rule| rule.variables.as_ref())
        .flat_map(|variables| variables.paths.iter())
        .collect()
}

/// Path-scoped capability check for secret variables
///
/// The nearest pattern is resolved against the full in-scope pattern set;
/// the check passes when some in-scope rule carries both that pattern and
/// the requested capability.
pub fn variables_allow(
    policies: &[PolicyDocument],
    namespace: &str,
    path: &str,
    capability: &str,
) -> bool {
    let rules = variable_path_rules(policies, namespace);
    if rules.is_empty() {
        return false;
    }

    let patterns: Vec<&str> = rules.iter().map(|rule| rule.pattern.as_str()).collect();
    let nearest = select_best_path(&patterns, path);
    trace!(path, nearest, "resolved nearest path pattern");

    rules.iter().any(|rule| {
        rule.pattern == nearest && rule.capabilities.iter().any(|granted| granted == capability)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_common::policy::PolicyDocument;

    fn policy(json: &str) -> PolicyDocument {
        PolicyDocument::from_json(json).unwrap()
    }

    fn job_reader() -> PolicyDocument {
        policy(
            r#"{
                "id": "job-reader",
                "rules": {
                    "Namespaces": [{ "Name": "default", "Capabilities": ["list-jobs"] }]
                }
            }"#,
        )
    }

    fn job_writer() -> PolicyDocument {
        policy(
            r#"{
                "id": "job-writer",
                "rules": {
                    "Namespaces": [{ "Name": "default", "Capabilities": ["submit-job"] }]
                }
            }"#,
        )
    }

    #[test]
    fn test_single_policy_grants_and_denies() {
        let policies = vec![job_reader()];
        assert!(can(&policies, "list-jobs", "default", None));
        assert!(!can(&policies, "submit-job", "default", None));
    }

    #[test]
    fn test_policies_are_additive() {
        // One permissive policy is sufficient even when another is silent.
        let policies = vec![job_reader(), job_writer()];
        assert!(can(&policies, "submit-job", "default", None));
        assert!(can(&policies, "list-jobs", "default", None));
    }

    #[test]
    fn test_empty_policies_deny() {
        assert!(!can(&[], "list-jobs", "default", None));
    }

    #[test]
    fn test_unknown_capability_denies() {
        let policies = vec![job_reader()];
        assert!(!can(&policies, "time-travel", "default", None));
    }

    #[test]
    fn test_rules_for_namespace_picks_best_per_policy() {
        let doc = policy(
            r#"{
                "id": "layered",
                "rules": {
                    "Namespaces": [
                        { "Name": "prod-*", "Capabilities": ["list-jobs"] },
                        { "Name": "prod-web-*", "Capabilities": ["submit-job"] }
                    ]
                }
            }"#,
        );
        let policies = vec![doc];

        let rules = rules_for_namespace(&policies, "prod-web-1");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "prod-web-*");

        // The narrower rule wins, so only its capabilities apply.
        assert!(can(&policies, "submit-job", "prod-web-1", None));
        assert!(!can(&policies, "list-jobs", "prod-web-1", None));
    }

    #[test]
    fn test_namespace_allows_considers_every_matching_rule() {
        let doc = policy(
            r#"{
                "id": "layered",
                "rules": {
                    "Namespaces": [
                        { "Name": "prod-*", "Capabilities": ["list-jobs"] },
                        { "Name": "prod-web-*", "Capabilities": ["submit-job"] }
                    ]
                }
            }"#,
        );
        let policies = vec![doc];

        // Any-match semantics union across overlapping globs.
        assert!(namespace_allows(&policies, "prod-web-1", "list-jobs"));
        assert!(namespace_allows(&policies, "prod-web-1", "submit-job"));
        assert!(!namespace_allows(&policies, "dev", "list-jobs"));
    }

    #[test]
    fn test_default_namespace_fallback() {
        let doc = policy(
            r#"{
                "id": "fallback",
                "rules": {
                    "Namespaces": [{ "Name": "default", "Capabilities": ["read-job"] }]
                }
            }"#,
        );
        let policies = vec![doc];
        assert!(can(&policies, "read-job", "unlisted", None));
    }

    #[test]
    fn test_wildcard_namespace_checks_all_namespaces() {
        let doc = policy(
            r#"{
                "id": "scoped",
                "rules": {
                    "Namespaces": [{ "Name": "team-a", "Capabilities": ["submit-job"] }]
                }
            }"#,
        );
        let policies = vec![doc];
        assert!(can(&policies, "submit-job", "*", None));
        assert!(!can(&policies, "dispatch-job", "*", None));
    }

    #[test]
    fn test_capabilities_for_namespace_union() {
        let policies = vec![job_reader(), job_writer()];
        let caps = capabilities_for_namespace(&policies, "default");
        assert!(caps.contains("list-jobs"));
        assert!(caps.contains("submit-job"));
        assert_eq!(caps.len(), 2);
    }

    fn variables_policy() -> PolicyDocument {
        policy(
            r#"{
                "id": "vars",
                "rules": {
                    "Namespaces": [{
                        "Name": "default",
                        "Variables": {
                            "Paths": [
                                { "PathSpec": "*", "Capabilities": ["list"] },
                                { "PathSpec": "nested/variables/*", "Capabilities": ["list", "read"] },
                                { "PathSpec": "nested/variables/secret", "Capabilities": ["list", "read", "write", "destroy"] }
                            ]
                        }
                    }]
                }
            }"#,
        )
    }

    #[test]
    fn test_variables_exact_path_rule() {
        let policies = vec![variables_policy()];
        assert!(can(&policies, "write", "default", Some("nested/variables/secret")));
        assert!(can(&policies, "destroy", "default", Some("nested/variables/secret")));
    }

    #[test]
    fn test_variables_nearest_glob_rule() {
        let policies = vec![variables_policy()];
        // nested/variables/foo resolves to nested/variables/*, which lacks write.
        assert!(can(&policies, "read", "default", Some("nested/variables/foo")));
        assert!(!can(&policies, "write", "default", Some("nested/variables/foo")));
    }

    #[test]
    fn test_variables_fall_back_to_catch_all() {
        let policies = vec![variables_policy()];
        assert!(can(&policies, "list", "default", Some("elsewhere/entirely")));
        assert!(!can(&policies, "read", "default", Some("elsewhere/entirely")));
    }

    #[test]
    fn test_variables_no_catch_all_denies() {
        let doc = policy(
            r#"{
                "id": "narrow",
                "rules": {
                    "Namespaces": [{
                        "Name": "default",
                        "Variables": {
                            "Paths": [{ "PathSpec": "project/*", "Capabilities": ["read"] }]
                        }
                    }]
                }
            }"#,
        );
        let policies = vec![doc];
        // The resolved pattern is "*", which no rule defines: deny.
        assert!(!can(&policies, "read", "default", Some("elsewhere")));
    }

    #[test]
    fn test_variables_namespace_scoping() {
        let doc = policy(
            r#"{
                "id": "scoped-vars",
                "rules": {
                    "Namespaces": [
                        {
                            "Name": "team-a",
                            "Variables": {
                                "Paths": [{ "PathSpec": "shared/*", "Capabilities": ["read"] }]
                            }
                        },
                        {
                            "Name": "*",
                            "Variables": {
                                "Paths": [{ "PathSpec": "global/*", "Capabilities": ["list"] }]
                            }
                        }
                    ]
                }
            }"#,
        );
        let policies = vec![doc];

        // Rules under another namespace are out of scope.
        assert!(!can(&policies, "read", "team-b", Some("shared/thing")));
        assert!(can(&policies, "read", "team-a", Some("shared/thing")));

        // Wildcard-namespace rules apply everywhere.
        assert!(can(&policies, "list", "team-b", Some("global/thing")));

        // A wildcard target namespace skips namespace filtering.
        assert!(can(&policies, "read", "*", Some("shared/thing")));
    }

    #[test]
    fn test_variables_deny_capability_never_matches_requests() {
        let doc = policy(
            r#"{
                "id": "deny-vars",
                "rules": {
                    "Namespaces": [{
                        "Name": "default",
                        "Variables": {
                            "Paths": [{ "PathSpec": "locked/*", "Capabilities": ["deny"] }]
                        }
                    }]
                }
            }"#,
        );
        let policies = vec![doc];
        assert!(!can(&policies, "read", "default", Some("locked/thing")));
        assert!(!can(&policies, "write", "default", Some("locked/thing")));
    }
}
