///! Ability layer
///!
///! Named permission checks consumed by the presentation layer. A small
///! capability table maps resource/operation pairs onto the namespace
///! capability they require; one generic check applies the two universal
///! overrides before consulting the evaluator.

use crate::evaluator;
use warden_common::policy::*;
use warden_common::token::TokenSnapshot;

/// Resource kinds surfaced by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Job,
    Allocation,
    Logs,
    Filesystem,
    Volume,
    ScalingPolicy,
    Variable,
    Recommendation,
    // Coarse resources carry a single policy string per document.
    Agent,
    Node,
    Operator,
    Quota,
}

/// Operations the dashboard can gate on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Write,
    Submit,
    Dispatch,
    Scale,
    Exec,
    Lifecycle,
    Destroy,
}

/// What a check is aimed at: a namespace and, for variables, a path
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub namespace: &'a str,
    pub path: Option<&'a str>,
}

impl<'a> Target<'a> {
    /// Target a namespace
    pub fn namespace(namespace: &'a str) -> Self {
        Self { namespace, path: None }
    }

    /// Target a secret-variable path within a namespace
    pub fn path(namespace: &'a str, path: &'a str) -> Self {
        Self { namespace, path: Some(path) }
    }
}

/// Namespace capability required for a resource/operation pair
///
/// Coarse resources have no entry; they are gated on policy strings, not
/// capabilities.
fn required_capability(resource: Resource, operation: Operation) -> Option<&'static str> {
    match (resource, operation) {
        (Resource::Job, Operation::List) => Some(CAP_LIST_JOBS),
        (Resource::Job, Operation::Read) => Some(CAP_READ_JOB),
        (Resource::Job, Operation::Submit) => Some(CAP_SUBMIT_JOB),
        (Resource::Job, Operation::Dispatch) => Some(CAP_DISPATCH_JOB),
        (Resource::Job, Operation::Scale) => Some(CAP_SCALE_JOB),

        (Resource::Allocation, Operation::Exec) => Some(CAP_ALLOC_EXEC),
        (Resource::Allocation, Operation::Lifecycle) => Some(CAP_ALLOC_LIFECYCLE),

        (Resource::Logs, Operation::Read) => Some(CAP_READ_LOGS),
        (Resource::Filesystem, Operation::Read) => Some(CAP_READ_FS),

        (Resource::Volume, Operation::List) => Some(CAP_CSI_LIST_VOLUME),
        (Resource::Volume, Operation::Read) => Some(CAP_CSI_READ_VOLUME),
        (Resource::Volume, Operation::Write) => Some(CAP_CSI_WRITE_VOLUME),

        (Resource::ScalingPolicy, Operation::List) => Some(CAP_LIST_SCALING_POLICIES),
        (Resource::ScalingPolicy, Operation::Read) => Some(CAP_READ_SCALING_POLICY),

        (Resource::Recommendation, Operation::Submit) => Some(CAP_SUBMIT_RECOMMENDATION),

        (Resource::Variable, Operation::List) => Some(VAR_CAP_LIST),
        (Resource::Variable, Operation::Read) => Some(VAR_CAP_READ),
        (Resource::Variable, Operation::Write) => Some(VAR_CAP_WRITE),
        (Resource::Variable, Operation::Destroy) => Some(VAR_CAP_DESTROY),

        _ => None,
    }
}

/// Permission checks bound to one token snapshot
#[derive(Debug, Clone, Copy)]
pub struct Abilities<'a> {
    token: &'a TokenSnapshot,
}

impl<'a> Abilities<'a> {
    pub fn new(token: &'a TokenSnapshot) -> Self {
        Self { token }
    }

    /// Generic permission check
    ///
    /// The bypass and management overrides short-circuit before the
    /// matchers ever run; everything else routes through the evaluator.
    pub fn can(&self, resource: Resource, operation: Operation, target: Target<'_>) -> bool {
        if self.token.bypass_authorization() || self.token.is_management() {
            return true;
        }

        match resource {
            Resource::Agent => self.coarse_allows(operation, |rules| rules.agent.as_ref()),
            Resource::Node => self.coarse_allows(operation, |rules| rules.node.as_ref()),
            Resource::Operator => self.coarse_allows(operation, |rules| rules.operator.as_ref()),
            Resource::Quota => self.coarse_allows(operation, |rules| rules.quota.as_ref()),
            Resource::Variable => match required_capability(resource, operation) {
                Some(capability) => evaluator::can(
                    &self.token.policies,
                    capability,
                    target.namespace,
                    // A variable check without a path gates the section as a
                    // whole; the catch-all pattern stands in for it.
                    Some(target.path.unwrap_or(WILDCARD_GLOB)),
                ),
                None => false,
            },
            _ => match required_capability(resource, operation) {
                Some(capability) => {
                    evaluator::can(&self.token.policies, capability, target.namespace, None)
                }
                None => false,
            },
        }
    }

    /// Direct policy-string comparison for coarse rule blocks
    ///
    /// Read is satisfied by read or write; write only by write.
    fn coarse_allows<F>(&self, operation: Operation, select: F) -> bool
    where
        F: Fn(&RuleSet) -> Option<&CoarseRule>,
    {
        self.token
            .policies
            .iter()
            .filter_map(|policy| select(&policy.rules))
            .any(|rule| match operation {
                Operation::Read => rule.policy == POLICY_READ || rule.policy == POLICY_WRITE,
                Operation::Write => rule.policy == POLICY_WRITE,
                _ => false,
            })
    }

    // Named wrappers for the checks the dashboard binds to buttons.

    pub fn can_list_jobs(&self, namespace: &str) -> bool {
        self.can(Resource::Job, Operation::List, Target::namespace(namespace))
    }

    pub fn can_run_job(&self, namespace: &str) -> bool {
        self.can(Resource::Job, Operation::Submit, Target::namespace(namespace))
    }

    pub fn can_dispatch_job(&self, namespace: &str) -> bool {
        self.can(Resource::Job, Operation::Dispatch, Target::namespace(namespace))
    }

    pub fn can_scale_job(&self, namespace: &str) -> bool {
        self.can(Resource::Job, Operation::Scale, Target::namespace(namespace))
    }

    pub fn can_exec_allocation(&self, namespace: &str) -> bool {
        self.can(Resource::Allocation, Operation::Exec, Target::namespace(namespace))
    }

    pub fn can_read_node(&self) -> bool {
        self.can(Resource::Node, Operation::Read, Target::namespace(DEFAULT_NAMESPACE))
    }

    pub fn can_write_node(&self) -> bool {
        self.can(Resource::Node, Operation::Write, Target::namespace(DEFAULT_NAMESPACE))
    }

    pub fn can_list_variables(&self, namespace: &str, path: &str) -> bool {
        self.can(Resource::Variable, Operation::List, Target::path(namespace, path))
    }

    pub fn can_read_variable(&self, namespace: &str, path: &str) -> bool {
        self.can(Resource::Variable, Operation::Read, Target::path(namespace, path))
    }

    pub fn can_write_variable(&self, namespace: &str, path: &str) -> bool {
        self.can(Resource::Variable, Operation::Write, Target::path(namespace, path))
    }

    pub fn can_destroy_variable(&self, namespace: &str, path: &str) -> bool {
        self.can(Resource::Variable, Operation::Destroy, Target::path(namespace, path))
    }
}
