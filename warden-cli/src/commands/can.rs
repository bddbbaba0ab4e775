use crate::output::{self, OutputFormat};
use anyhow::{anyhow, Result};
use serde::Serialize;
use warden_acl::{Abilities, Operation, Resource, Target};
use warden_common::token::TokenSnapshot;

#[derive(Debug, Serialize)]
struct Decision<'a> {
    resource: &'a str,
    operation: &'a str,
    namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    allowed: bool,
}

pub fn handle_can_command(
    token: &TokenSnapshot,
    resource: &str,
    operation: &str,
    namespace: &str,
    path: Option<&str>,
    output_format: OutputFormat,
) -> Result<()> {
    let parsed_resource = parse_resource(resource)?;
    let parsed_operation = parse_operation(operation)?;

    let target = match path {
        Some(path) => Target::path(namespace, path),
        None => Target::namespace(namespace),
    };

    let allowed = Abilities::new(token).can(parsed_resource, parsed_operation, target);

    match output_format {
        OutputFormat::Table => {
            let check = match path {
                Some(path) => format!("{} {} on '{}' in namespace '{}'", resource, operation, path, namespace),
                None => format!("{} {} in namespace '{}'", resource, operation, namespace),
            };
            output::print_decision(&check, allowed);
        }
        _ => {
            let decision = Decision {
                resource,
                operation,
                namespace,
                path,
                allowed,
            };
            output::print_value(&decision, output_format)?;
        }
    }

    if !allowed {
        std::process::exit(1);
    }
    Ok(())
}

fn parse_resource(s: &str) -> Result<Resource> {
    match s.to_lowercase().as_str() {
        "job" => Ok(Resource::Job),
        "allocation" | "alloc" => Ok(Resource::Allocation),
        "logs" => Ok(Resource::Logs),
        "filesystem" | "fs" => Ok(Resource::Filesystem),
        "volume" => Ok(Resource::Volume),
        "scaling-policy" => Ok(Resource::ScalingPolicy),
        "variable" | "var" => Ok(Resource::Variable),
        "recommendation" => Ok(Resource::Recommendation),
        "agent" => Ok(Resource::Agent),
        "node" => Ok(Resource::Node),
        "operator" => Ok(Resource::Operator),
        "quota" => Ok(Resource::Quota),
        _ => Err(anyhow!("unknown resource '{}'", s)),
    }
}

fn parse_operation(s: &str) -> Result<Operation> {
    match s.to_lowercase().as_str() {
        "list" => Ok(Operation::List),
        "read" => Ok(Operation::Read),
        "write" => Ok(Operation::Write),
        "submit" | "run" => Ok(Operation::Submit),
        "dispatch" => Ok(Operation::Dispatch),
        "scale" => Ok(Operation::Scale),
        "exec" => Ok(Operation::Exec),
        "lifecycle" => Ok(Operation::Lifecycle),
        "destroy" => Ok(Operation::Destroy),
        _ => Err(anyhow!("unknown operation '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resource_aliases() {
        assert_eq!(parse_resource("alloc").unwrap(), Resource::Allocation);
        assert_eq!(parse_resource("VAR").unwrap(), Resource::Variable);
        assert!(parse_resource("cluster").is_err());
    }

    #[test]
    fn test_parse_operation_aliases() {
        assert_eq!(parse_operation("run").unwrap(), Operation::Submit);
        assert_eq!(parse_operation("destroy").unwrap(), Operation::Destroy);
        assert!(parse_operation("fly").is_err());
    }
}
