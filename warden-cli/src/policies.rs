///! Policy file loading
///!
///! Builds the token snapshot a CLI invocation evaluates against.

use anyhow::{Context, Result};
use warden_common::policy::PolicyDocument;
use warden_common::token::{TokenSnapshot, TokenType};

/// Load policy documents from a JSON file
///
/// Accepts either a single policy document or an array of them.
pub fn load_policies(path: &str) -> Result<Vec<PolicyDocument>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy file '{}'", path))?;

    let mut documents: Vec<PolicyDocument> = if contents.trim_start().starts_with('[') {
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse policy file '{}'", path))?
    } else {
        vec![serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse policy file '{}'", path))?]
    };

    for document in &mut documents {
        document
            .normalize()
            .with_context(|| format!("invalid policy '{}' in '{}'", document.id, path))?;
    }

    Ok(documents)
}

/// Build the token snapshot for an invocation
///
/// Management and acl-disabled flags mirror the cluster-side overrides, so
/// policies can be inspected under either condition.
pub fn load_token(path: &str, management: bool, acl_disabled: bool) -> Result<TokenSnapshot> {
    let policies = load_policies(path)?;
    let token_type = if management {
        TokenType::Management
    } else {
        TokenType::Client
    };

    Ok(TokenSnapshot {
        acl_enabled: !acl_disabled,
        token_type: Some(token_type),
        policies,
    })
}
