///! Warden CLI
///!
///! Command-line front end for the Warden ACL evaluation engine: evaluates
///! permission checks against policy documents the same way the dashboard
///! does, for debugging policies before attaching them to tokens.

mod commands;
mod output;
mod policies;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Policy file (JSON: one policy document or an array of them)
    #[arg(short, long, default_value = "policies.json")]
    policies: String,

    /// Evaluate as a management (superuser) token
    #[arg(long)]
    management: bool,

    /// Evaluate as if the ACL subsystem were disabled cluster-wide
    #[arg(long)]
    acl_disabled: bool,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether an operation is permitted
    Can {
        /// Resource kind (job, allocation, variable, node, ...)
        resource: String,
        /// Operation (list, read, write, submit, exec, ...)
        operation: String,
        /// Target namespace; "*" checks across all namespaces
        #[arg(short, long, default_value = "default")]
        namespace: String,
        /// Secret-variable path, for variable checks
        #[arg(long)]
        path: Option<String>,
    },
    /// List capabilities granted on a namespace
    Capabilities {
        /// Target namespace; "*" lists across all namespaces
        #[arg(short, long, default_value = "default")]
        namespace: String,
    },
    /// Policy file operations
    Policy {
        #[command(subcommand)]
        command: PolicyCommands,
    },
}

#[derive(Subcommand)]
enum PolicyCommands {
    /// Parse and validate policy document files
    Validate {
        /// Files to validate
        files: Vec<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let format = output::OutputFormat::from_str(&cli.output);

    match cli.command {
        Commands::Can {
            resource,
            operation,
            namespace,
            path,
        } => {
            let token = policies::load_token(&cli.policies, cli.management, cli.acl_disabled)?;
            commands::can::handle_can_command(
                &token,
                &resource,
                &operation,
                &namespace,
                path.as_deref(),
                format,
            )
        }
        Commands::Capabilities { namespace } => {
            let token = policies::load_token(&cli.policies, cli.management, cli.acl_disabled)?;
            commands::capabilities::handle_capabilities_command(&token, &namespace, format)
        }
        Commands::Policy { command } => match command {
            PolicyCommands::Validate { files } => {
                commands::policy::handle_validate_command(&files)
            }
        },
    }
}
