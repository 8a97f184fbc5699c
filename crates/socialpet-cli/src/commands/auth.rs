use std::io::{self, IsTerminal};

use anyhow::anyhow;
use socialpet_api_models::RegisterRequest;
use socialpet_client::AuthService;

use crate::cli::{LoginArgs, RegisterArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{render_account, render_profile};

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    let password = resolve_password(args.password, "Password: ")?;
    let profile = AuthService::new(ctx.client.clone())
        .login(&args.email, &password)
        .await?;
    render_profile(&profile, ctx.output)
}

pub(crate) async fn handle_register(ctx: &AppContext, args: RegisterArgs) -> CliResult<()> {
    let (password, confirm_password) = match args.password {
        Some(password) => {
            let password = resolve_password(Some(password), "Password: ")?;
            (password.clone(), password)
        }
        None => (
            resolve_password(None, "Password: ")?,
            resolve_password(None, "Confirm password: ")?,
        ),
    };
    let payload = RegisterRequest {
        first_name: args.first_name.trim().to_string(),
        last_name: args.last_name.trim().to_string(),
        user_name: args.username.trim().to_string(),
        email: args.email.trim().to_string(),
        phone_number: args.phone.trim().to_string(),
        password,
        confirm_password,
    };
    AuthService::new(ctx.client.clone())
        .register(&payload)
        .await?;
    println!(
        "Account created for {}. Verify your email, then run `socialpet login`.",
        payload.email
    );
    Ok(())
}

pub(crate) async fn handle_logout(ctx: &AppContext) -> CliResult<()> {
    let was_signed_in = ctx.client.session().is_authenticated();
    AuthService::new(ctx.client.clone()).logout().await?;
    if was_signed_in {
        println!("Signed out.");
    } else {
        println!("No active session.");
    }
    Ok(())
}

pub(crate) async fn handle_whoami(ctx: &AppContext) -> CliResult<()> {
    if !ctx.client.session().is_authenticated() {
        return Err(CliError::validation(
            "not signed in; run `socialpet login` first",
        ));
    }
    let account = AuthService::new(ctx.client.clone()).current_user().await?;
    render_account(&account, ctx.output)
}

pub(crate) fn resolve_password(value: Option<String>, prompt: &str) -> CliResult<String> {
    if let Some(value) = value {
        if value.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(value);
    }

    if io::stdin().is_terminal() {
        let password = rpassword::prompt_password(prompt).map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        if password.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(password)
    } else {
        Err(CliError::validation(
            "password required; supply via --password or SOCIALPET_PASSWORD when running non-interactively",
        ))
    }
}
