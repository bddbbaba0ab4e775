///! Policy document model
///!
///! Parsed form of the cluster's authorization-policy language, as returned
///! by the token self endpoint. Shapes mirror the server's rule tree; all
///! collections default to empty so the evaluation layer never sees nulls.

use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Shorthand policy levels accepted in rule blocks
pub const POLICY_DENY: &str = "deny";
pub const POLICY_READ: &str = "read";
pub const POLICY_LIST: &str = "list";
pub const POLICY_WRITE: &str = "write";
pub const POLICY_SCALE: &str = "scale";

/// Fine-grained capabilities grantable within a namespace
pub const CAP_DENY: &str = "deny";
pub const CAP_LIST_JOBS: &str = "list-jobs";
pub const CAP_PARSE_JOB: &str = "parse-job";
pub const CAP_READ_JOB: &str = "read-job";
pub const CAP_SUBMIT_JOB: &str = "submit-job";
pub const CAP_DISPATCH_JOB: &str = "dispatch-job";
pub const CAP_READ_LOGS: &str = "read-logs";
pub const CAP_READ_FS: &str = "read-fs";
pub const CAP_ALLOC_EXEC: &str = "alloc-exec";
pub const CAP_ALLOC_NODE_EXEC: &str = "alloc-node-exec";
pub const CAP_ALLOC_LIFECYCLE: &str = "alloc-lifecycle";
pub const CAP_SENTINEL_OVERRIDE: &str = "sentinel-override";
pub const CAP_CSI_REGISTER_PLUGIN: &str = "csi-register-plugin";
pub const CAP_CSI_WRITE_VOLUME: &str = "csi-write-volume";
pub const CAP_CSI_READ_VOLUME: &str = "csi-read-volume";
pub const CAP_CSI_LIST_VOLUME: &str = "csi-list-volume";
pub const CAP_CSI_MOUNT_VOLUME: &str = "csi-mount-volume";
pub const CAP_LIST_SCALING_POLICIES: &str = "list-scaling-policies";
pub const CAP_READ_SCALING_POLICY: &str = "read-scaling-policy";
pub const CAP_READ_JOB_SCALING: &str = "read-job-scaling";
pub const CAP_SCALE_JOB: &str = "scale-job";
pub const CAP_SUBMIT_RECOMMENDATION: &str = "submit-recommendation";

/// Capabilities grantable on a secret-variable path
pub const VAR_CAP_LIST: &str = "list";
pub const VAR_CAP_READ: &str = "read";
pub const VAR_CAP_WRITE: &str = "write";
pub const VAR_CAP_DESTROY: &str = "destroy";
pub const VAR_CAP_DENY: &str = "deny";

/// Namespace / pattern that matches everything
pub const WILDCARD_GLOB: &str = "*";

/// Fallback namespace when nothing more specific matches
pub const DEFAULT_NAMESPACE: &str = "default";

static NAMESPACE_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9-*]{1,128}$").unwrap()
});

/// A policy document attached to a token
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Policy name as stored by the cluster
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Parsed rule tree
    #[serde(default)]
    pub rules: RuleSet,
}

/// The rule tree of a single policy document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RuleSet {
    #[serde(default)]
    pub namespaces: Vec<NamespaceRule>,

    // Coarse blocks carry a single policy string and are checked by direct
    // comparison, never by the matchers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<CoarseRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<CoarseRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<CoarseRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota: Option<CoarseRule>,
}

/// Rules scoped to one namespace name or glob
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamespaceRule {
    /// Literal namespace name or glob pattern
    pub name: String,

    /// Shorthand policy level, expanded into capabilities at parse time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,

    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Secret-variable path rules scoped to this namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<VariablesRule>,
}

/// Secret-variable rules within a namespace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VariablesRule {
    #[serde(default)]
    pub paths: Vec<PathRule>,
}

/// Capabilities granted on one path pattern
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PathRule {
    /// Literal slash-delimited path or glob pattern
    #[serde(rename = "PathSpec")]
    pub pattern: String,

    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// A rule block with a single policy string (agent, node, operator, quota)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CoarseRule {
    #[serde(default)]
    pub policy: String,
}

impl PolicyDocument {
    /// Parse a policy document from its JSON form and normalize it
    pub fn from_json(json: &str) -> Result<Self> {
        let mut doc: PolicyDocument = serde_json::from_str(json)?;
        doc.normalize()?;
        Ok(doc)
    }

    /// Validate rule shapes and expand shorthand policies into capabilities
    ///
    /// After this, evaluation only ever looks at capability lists.
    pub fn normalize(&mut self) -> Result<()> {
        for ns in &mut self.rules.namespaces {
            if !NAMESPACE_NAME_REGEX.is_match(&ns.name) {
                return Err(Error::InvalidNamespace(ns.name.clone()));
            }

            if let Some(policy) = &ns.policy {
                let extra = expand_namespace_policy(policy).ok_or_else(|| {
                    Error::InvalidPolicy(
                        self.id.clone(),
                        format!("invalid policy '{}' for namespace '{}'", policy, ns.name),
                    )
                })?;
                ns.capabilities.extend(extra.iter().map(|c| c.to_string()));
            }

            if let Some(variables) = &mut ns.variables {
                for path in &mut variables.paths {
                    if path.pattern.is_empty() {
                        return Err(Error::InvalidPathPattern(
                            ns.name.clone(),
                            "empty path spec".to_string(),
                        ));
                    }
                    path.capabilities =
                        expand_variables_capabilities(std::mem::take(&mut path.capabilities));
                }
            }
        }

        for (block, rule) in [
            ("agent", &self.rules.agent),
            ("node", &self.rules.node),
            ("operator", &self.rules.operator),
            ("quota", &self.rules.quota),
        ] {
            if let Some(rule) = rule {
                if !is_policy_valid(&rule.policy) {
                    return Err(Error::InvalidPolicy(
                        self.id.clone(),
                        format!("invalid {} policy '{}'", block, rule.policy),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Check that a shorthand policy string is one of the valid levels
pub fn is_policy_valid(policy: &str) -> bool {
    matches!(policy, POLICY_DENY | POLICY_READ | POLICY_WRITE | POLICY_SCALE)
}

/// Equivalent capability set for a namespace shorthand policy
///
/// Returns None for unknown shorthand values. Unknown entries inside an
/// explicit capability list are left alone; the vocabulary is open and an
/// unrecognized capability simply never matches.
pub fn expand_namespace_policy(policy: &str) -> Option<&'static [&'static str]> {
    const READ: &[&str] = &[
        CAP_LIST_JOBS,
        CAP_PARSE_JOB,
        CAP_READ_JOB,
        CAP_CSI_LIST_VOLUME,
        CAP_CSI_READ_VOLUME,
        CAP_READ_JOB_SCALING,
        CAP_LIST_SCALING_POLICIES,
        CAP_READ_SCALING_POLICY,
    ];
    const WRITE: &[&str] = &[
        CAP_LIST_JOBS,
        CAP_PARSE_JOB,
        CAP_READ_JOB,
        CAP_CSI_LIST_VOLUME,
        CAP_CSI_READ_VOLUME,
        CAP_READ_JOB_SCALING,
        CAP_LIST_SCALING_POLICIES,
        CAP_READ_SCALING_POLICY,
        CAP_SCALE_JOB,
        CAP_SUBMIT_JOB,
        CAP_DISPATCH_JOB,
        CAP_READ_LOGS,
        CAP_READ_FS,
        CAP_ALLOC_EXEC,
        CAP_ALLOC_LIFECYCLE,
        CAP_CSI_MOUNT_VOLUME,
        CAP_CSI_WRITE_VOLUME,
        CAP_SUBMIT_RECOMMENDATION,
    ];
    const SCALE: &[&str] = &[
        CAP_LIST_SCALING_POLICIES,
        CAP_READ_SCALING_POLICY,
        CAP_READ_JOB_SCALING,
        CAP_SCALE_JOB,
    ];
    const DENY: &[&str] = &[CAP_DENY];

    match policy {
        POLICY_DENY => Some(DENY),
        POLICY_READ => Some(READ),
        POLICY_WRITE => Some(WRITE),
        POLICY_SCALE => Some(SCALE),
        _ => None,
    }
}

/// Normalize a variables capability list: read implies list
pub fn expand_variables_capabilities(caps: Vec<String>) -> Vec<String> {
    if caps.iter().any(|c| c == VAR_CAP_DENY) {
        return vec![VAR_CAP_DENY.to_string()];
    }
    let has_read = caps.iter().any(|c| c == VAR_CAP_READ);
    let has_list = caps.iter().any(|c| c == VAR_CAP_LIST);
    let mut caps = caps;
    if has_read && !has_list {
        caps.push(VAR_CAP_LIST.to_string());
    }
    caps
}
