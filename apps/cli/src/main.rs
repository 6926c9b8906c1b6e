//! `pimg`: activate Azure PIM group memberships from the terminal.

#![forbid(unsafe_code)]

mod commands;
mod config;
mod duration;
mod output;

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pimg_core::{AppError, AppResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::commands::Services;
use crate::commands::request::RequestArgs;
use crate::config::CliConfig;
use crate::output::Output;

const CANCELLED_EXIT_CODE: u8 = 130;

/// Manage access to Privileged Identity Management (PIM) groups in Azure.
#[derive(Parser, Debug)]
#[command(name = "pimg", version, about = "PIM Group Management CLI")]
struct Cli {
    /// Simple output in tabular format.
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List eligible groups.
    List {
        /// List all Entra ID groups, not just eligible PIM ones.
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// List active group activations.
    Active,

    /// List pending activation requests.
    Pending,

    /// List both active and pending group activations.
    Status,

    /// Request activation for a PIM group.
    #[command(visible_alias = "activate")]
    Request {
        /// Name of the PIM group to request activation for.
        #[arg(long, short = 'n')]
        name: String,
        /// Role to activate within the group.
        #[arg(long, default_value = "Member")]
        role: String,
        /// Reason for requesting activation.
        #[arg(long, short = 'r')]
        reason: Option<String>,
        /// Duration for the activation (e.g. 30m, 1h, 2h30m).
        #[arg(long, short = 'd', default_value = "12h", value_parser = duration::parse_duration)]
        duration: Duration,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let output = Output::new(cli.quiet);
    output.banner(env!("CARGO_PKG_VERSION"));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling");
            trigger.cancel();
        }
    });

    match run(cli, &output, cancel).await {
        Ok(code) => code,
        Err(AppError::Cancelled) => {
            output.error("operation cancelled");
            ExitCode::from(CANCELLED_EXIT_CODE)
        }
        Err(error) => {
            output.error(error);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output, cancel: CancellationToken) -> AppResult<ExitCode> {
    let config = CliConfig::load()?;
    debug!(?config, "configuration loaded");

    let services = Services::build(&config)?;
    let context = commands::sign_in(&services, output, cancel).await?;

    match cli.command {
        Commands::List { all: true } => commands::list::all_groups(&services, &context, output).await?,
        Commands::List { all: false } => commands::list::eligible(&services, &context, output).await?,
        Commands::Active => commands::assignments::active(&services, &context, output).await?,
        Commands::Pending => commands::assignments::pending(&services, &context, output).await?,
        Commands::Status => return commands::status(&services, &context, output).await,
        Commands::Request {
            name,
            role,
            reason,
            duration,
        } => {
            commands::request::request(
                &services,
                &context,
                output,
                RequestArgs {
                    group_name: name,
                    role_name: role,
                    reason,
                    duration,
                },
            )
            .await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;

    use super::{Cli, Commands};

    #[test]
    fn request_defaults_role_and_duration() {
        let cli = Cli::try_parse_from(["pimg", "request", "-n", "Platform Admins"]);

        assert!(matches!(
            cli.map(|cli| cli.command),
            Ok(Commands::Request { ref name, ref role, reason: None, duration })
                if name == "Platform Admins"
                    && role == "Member"
                    && duration == Duration::from_secs(12 * 3600)
        ));
    }

    #[test]
    fn activate_alias_and_global_quiet_flag() {
        let cli = Cli::try_parse_from([
            "pimg", "activate", "--name", "Ops", "--role", "Owner", "-r", "incident", "-d", "90m",
            "-q",
        ]);

        assert!(matches!(
            cli,
            Ok(Cli { quiet: true, command: Commands::Request { ref role, ref reason, duration, .. } })
                if role == "Owner"
                    && reason.as_deref() == Some("incident")
                    && duration == Duration::from_secs(5400)
        ));
    }

    #[test]
    fn request_requires_a_group_name() {
        assert!(Cli::try_parse_from(["pimg", "request"]).is_err());
    }

    #[test]
    fn list_all_flag_parses() {
        let cli = Cli::try_parse_from(["pimg", "list", "-a"]);
        assert!(matches!(cli.map(|cli| cli.command), Ok(Commands::List { all: true })));
    }

    #[test]
    fn bad_duration_is_a_usage_error() {
        assert!(Cli::try_parse_from(["pimg", "request", "-n", "Ops", "-d", "soon"]).is_err());
    }
}
