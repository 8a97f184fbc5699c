//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use socialpet_config::{
    ENV_API_URL, ENV_LOG_LEVEL, ENV_STATE_DIR, ENV_TIMEOUT_MS, TelemetrySettings,
};
use socialpet_telemetry::{
    LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_setting,
};

use crate::client::{AppContext, CliResult};
use crate::commands::auth::{handle_login, handle_logout, handle_register, handle_whoami};
use crate::commands::listings::{
    handle_adoption_list, handle_adoption_show, handle_donation_list, handle_donation_show,
    handle_lost_list, handle_lost_show,
};
use crate::commands::pets::{
    handle_breeds, handle_pet_list, handle_pet_show, handle_user_list, handle_user_show,
};
use crate::commands::raw::handle_request;

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    init_tracing();
    let command_name = command_label(&cli.command);

    let result = match AppContext::from_cli(&cli) {
        Ok(ctx) => dispatch(cli.command, &ctx).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => {
            tracing::debug!(command = command_name, "command completed");
            0
        }
        Err(err) => {
            let exit_code = err.exit_code();
            tracing::debug!(command = command_name, exit_code, "command failed");
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

/// Session and request events stay quiet unless a level is requested.
const CLI_LOG_LEVEL: &str = "warn";

fn init_tracing() {
    let settings = TelemetrySettings::from_env();
    let level = if std::env::var_os(ENV_LOG_LEVEL).is_some() {
        settings.level.as_str()
    } else {
        CLI_LOG_LEVEL
    };
    let format =
        log_format_from_setting(settings.format.as_deref()).unwrap_or(LogFormat::Pretty);
    let config = LoggingConfig {
        level,
        format,
        build_sha: build_sha(),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: logging disabled: {err}");
    }
}

pub(crate) async fn dispatch(command: Command, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Login(args) => handle_login(ctx, args).await,
        Command::Register(args) => handle_register(ctx, args).await,
        Command::Logout => handle_logout(ctx).await,
        Command::Whoami => handle_whoami(ctx).await,
        Command::Adoption(adoption) => match adoption {
            AdoptionCommand::Ls => handle_adoption_list(ctx).await,
            AdoptionCommand::Show(args) => handle_adoption_show(ctx, args).await,
        },
        Command::Lost(lost) => match lost {
            LostCommand::Ls => handle_lost_list(ctx).await,
            LostCommand::Show(args) => handle_lost_show(ctx, args).await,
        },
        Command::Donations(donations) => match donations {
            DonationCommand::Ls => handle_donation_list(ctx).await,
            DonationCommand::Show(args) => handle_donation_show(ctx, args).await,
        },
        Command::Pets(pets) => match pets {
            PetCommand::Ls(args) => handle_pet_list(ctx, args).await,
            PetCommand::Show(args) => handle_pet_show(ctx, args).await,
        },
        Command::Breeds(args) => handle_breeds(ctx, args).await,
        Command::Users(users) => match users {
            UserCommand::Ls => handle_user_list(ctx).await,
            UserCommand::Show(args) => handle_user_show(ctx, args).await,
        },
        Command::Request(args) => handle_request(ctx, args).await,
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Register(_) => "register",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Adoption(AdoptionCommand::Ls) => "adoption_ls",
        Command::Adoption(AdoptionCommand::Show(_)) => "adoption_show",
        Command::Lost(LostCommand::Ls) => "lost_ls",
        Command::Lost(LostCommand::Show(_)) => "lost_show",
        Command::Donations(DonationCommand::Ls) => "donations_ls",
        Command::Donations(DonationCommand::Show(_)) => "donations_show",
        Command::Pets(PetCommand::Ls(_)) => "pets_ls",
        Command::Pets(PetCommand::Show(_)) => "pets_show",
        Command::Breeds(_) => "breeds",
        Command::Users(UserCommand::Ls) => "users_ls",
        Command::Users(UserCommand::Show(_)) => "users_show",
        Command::Request(_) => "request",
    }
}

#[derive(Parser)]
#[command(name = "socialpet", about = "Terminal client for the SocialPet backend")]
pub(crate) struct Cli {
    #[arg(long, global = true, env = ENV_API_URL, help = "Backend origin, e.g. http://localhost:8080")]
    pub(crate) api_url: Option<String>,
    #[arg(long, global = true, env = ENV_TIMEOUT_MS, help = "Per-request timeout in milliseconds")]
    pub(crate) timeout_ms: Option<u64>,
    #[arg(long, global = true, env = ENV_STATE_DIR, help = "Directory holding the saved session")]
    pub(crate) state_dir: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Sign in and save the session.
    Login(LoginArgs),
    /// Create an account.
    Register(RegisterArgs),
    /// Sign out and forget the saved session.
    Logout,
    /// Show the signed-in account.
    Whoami,
    /// Adoption listings.
    #[command(subcommand)]
    Adoption(AdoptionCommand),
    /// Lost-pet reports.
    #[command(subcommand)]
    Lost(LostCommand),
    /// Donation organizations.
    #[command(subcommand)]
    Donations(DonationCommand),
    /// Pet profiles.
    #[command(subcommand)]
    Pets(PetCommand),
    /// Breed catalogue.
    Breeds(BreedArgs),
    /// Account lookups.
    #[command(subcommand)]
    Users(UserCommand),
    /// Send an arbitrary request through the session-aware client.
    Request(RequestArgs),
}

#[derive(Subcommand)]
pub(crate) enum AdoptionCommand {
    /// List recent listings.
    Ls,
    /// Show one listing by slug.
    Show(SlugArgs),
}

#[derive(Subcommand)]
pub(crate) enum LostCommand {
    /// List open reports.
    Ls,
    /// Show one report.
    Show(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum DonationCommand {
    /// List organizations accepting donations.
    Ls,
    /// Show one organization.
    Show(NumericIdArgs),
}

#[derive(Subcommand)]
pub(crate) enum PetCommand {
    /// List pets, optionally for one owner.
    Ls(PetListArgs),
    /// Show one pet.
    Show(PetIdArgs),
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    /// List every account (admin only).
    Ls,
    /// Show one account.
    Show(UserIdArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "SOCIALPET_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct RegisterArgs {
    #[arg(long)]
    pub(crate) first_name: String,
    #[arg(long)]
    pub(crate) last_name: String,
    #[arg(long)]
    pub(crate) username: String,
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) phone: String,
    #[arg(long, env = "SOCIALPET_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct SlugArgs {
    #[arg(help = "Listing slug")]
    pub(crate) slug: String,
}

#[derive(Args)]
pub(crate) struct IdArgs {
    #[arg(help = "Report identifier")]
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct NumericIdArgs {
    #[arg(help = "Organization identifier")]
    pub(crate) id: i64,
}

#[derive(Args)]
pub(crate) struct PetListArgs {
    #[arg(long, help = "Only pets of this owner account")]
    pub(crate) owner: Option<i64>,
}

#[derive(Args)]
pub(crate) struct PetIdArgs {
    #[arg(help = "Pet identifier")]
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct BreedArgs {
    #[arg(long, help = "Only breeds of this animal type, e.g. DOG")]
    pub(crate) animal_type: Option<String>,
    #[arg(
        long,
        conflicts_with = "animal_type",
        help = "List animal types instead of breeds"
    )]
    pub(crate) types: bool,
}

#[derive(Args)]
pub(crate) struct UserIdArgs {
    #[arg(help = "Account identifier")]
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct RequestArgs {
    #[arg(help = "HTTP method (GET, POST, PUT, PATCH, DELETE)")]
    pub(crate) method: String,
    #[arg(help = "Path relative to the API origin, e.g. /api/lostpets")]
    pub(crate) path: String,
    #[arg(long, help = "JSON request body")]
    pub(crate) body: Option<String>,
    #[arg(long = "query", value_name = "KEY=VALUE", help = "Query parameter; repeatable")]
    pub(crate) query: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() -> Result<()> {
        let cli = Cli::try_parse_from([
            "socialpet",
            "adoption",
            "ls",
            "--api-url",
            "http://pets.test",
            "--timeout-ms",
            "2500",
            "--output",
            "json",
        ])?;
        assert_eq!(cli.api_url.as_deref(), Some("http://pets.test"));
        assert_eq!(cli.timeout_ms, Some(2500));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(command_label(&cli.command), "adoption_ls");
        Ok(())
    }

    #[test]
    fn request_collects_repeated_query_flags() -> Result<()> {
        let cli = Cli::try_parse_from([
            "socialpet",
            "request",
            "DELETE",
            "/api/lostpets/lp-1",
            "--query",
            "userId=u-1",
            "--query",
            "force=true",
        ])?;
        let Command::Request(args) = cli.command else {
            return Err(anyhow::anyhow!("expected request command"));
        };
        assert_eq!(args.method, "DELETE");
        assert_eq!(args.query, vec!["userId=u-1", "force=true"]);
        Ok(())
    }

    #[test]
    fn pet_listing_takes_optional_owner() -> Result<()> {
        let cli = Cli::try_parse_from(["socialpet", "pets", "ls", "--owner", "42"])?;
        let Command::Pets(PetCommand::Ls(args)) = cli.command else {
            return Err(anyhow::anyhow!("expected pets ls"));
        };
        assert_eq!(args.owner, Some(42));
        let both = ["socialpet", "breeds", "--types", "--animal-type", "DOG"];
        assert!(Cli::try_parse_from(both).is_err());
        Ok(())
    }

    #[test]
    fn donation_ids_must_be_numeric() {
        assert!(Cli::try_parse_from(["socialpet", "donations", "show", "abc"]).is_err());
    }
}
