use crate::output::{self, OutputFormat};
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;
use warden_acl::evaluator;
use warden_common::policy::WILDCARD_GLOB;
use warden_common::token::TokenSnapshot;

#[derive(Debug, Serialize, Tabled)]
struct CapabilityRow {
    #[tabled(rename = "CAPABILITY")]
    capability: String,
    #[tabled(rename = "GRANTED BY")]
    granted_by: String,
}

pub fn handle_capabilities_command(
    token: &TokenSnapshot,
    namespace: &str,
    output_format: OutputFormat,
) -> Result<()> {
    let capabilities = if namespace == WILDCARD_GLOB {
        evaluator::capabilities_for_all_namespaces(&token.policies)
    } else {
        evaluator::capabilities_for_namespace(&token.policies, namespace)
    };

    let rows: Vec<CapabilityRow> = capabilities
        .into_iter()
        .map(|capability| CapabilityRow {
            capability: capability.to_string(),
            granted_by: granting_policies(token, namespace, capability).join(", "),
        })
        .collect();

    output::print_rows(&rows, output_format)
}

/// Policy ids whose applicable namespace rule grants the capability
fn granting_policies(token: &TokenSnapshot, namespace: &str, capability: &str) -> Vec<String> {
    token
        .policies
        .iter()
        .filter(|policy| {
            let single = std::slice::from_ref(*policy);
            if namespace == WILDCARD_GLOB {
                evaluator::capabilities_for_all_namespaces(single).contains(capability)
            } else {
                evaluator::capabilities_for_namespace(single, namespace).contains(capability)
            }
        })
        .map(|policy| policy.id.clone())
        .collect()
}
