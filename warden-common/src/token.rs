///! Token session types
///!
///! Read-only view of the signed-in token as supplied by the session
///! service. The snapshot is replaced wholesale on token refresh; the
///! evaluation layer never mutates it.

use crate::policy::PolicyDocument;
use serde::{Deserialize, Serialize};

/// Token type attached to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Client,
    Management,
}

/// Snapshot of the current token and its attached policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Whether the ACL subsystem is enabled cluster-wide
    pub acl_enabled: bool,

    /// Type of the signed-in token; None for anonymous sessions
    pub token_type: Option<TokenType>,

    /// Policies attached to the token
    pub policies: Vec<PolicyDocument>,
}

impl Default for TokenSnapshot {
    fn default() -> Self {
        // Deny-by-default: ACLs on, nobody signed in, no policies.
        Self {
            acl_enabled: true,
            token_type: None,
            policies: Vec::new(),
        }
    }
}

impl TokenSnapshot {
    /// Snapshot for a client token holding the given policies
    pub fn client(policies: Vec<PolicyDocument>) -> Self {
        Self {
            acl_enabled: true,
            token_type: Some(TokenType::Client),
            policies,
        }
    }

    /// Snapshot for a management (superuser) token
    pub fn management() -> Self {
        Self {
            acl_enabled: true,
            token_type: Some(TokenType::Management),
            policies: Vec::new(),
        }
    }

    /// Snapshot for a cluster with the ACL subsystem disabled
    pub fn acl_disabled() -> Self {
        Self {
            acl_enabled: false,
            token_type: None,
            policies: Vec::new(),
        }
    }

    pub fn is_management(&self) -> bool {
        self.token_type == Some(TokenType::Management)
    }

    /// True when ACLs are disabled and every check short-circuits to allow
    pub fn bypass_authorization(&self) -> bool {
        !self.acl_enabled
    }
}
