//! Account commands: login, logout, whoami, register, reset-password.

use console::style;
use dialoguer::Select;
use serde_json::json;

use ub_core::constants::BLOOD_TYPES;
use ub_core::error::{UbError, UbResult};
use ub_services::registration::{RegistrationForm, RegistrationService};
use ub_services::password_reset::PasswordResetService;
use ub_services::AppContext;

use crate::OutputFormat;

pub async fn login(ctx: &AppContext, email: Option<String>, format: OutputFormat) -> UbResult<()> {
    let email = match email {
        Some(e) => e,
        None => super::prompt("Email")?,
    };
    let password = super::prompt_password("Password")?;

    let pb = super::spinner("Signing in...");
    let result = ctx.session.sign_in(&email, &password).await;
    pb.finish_and_clear();

    let identity = result?;
    match format {
        OutputFormat::Json => super::print_json(&json!({ "identity": identity })),
        OutputFormat::Text => {
            println!("  {} Signed in as {}", style("OK").green().bold(), style(&identity).bold());
        }
    }
    Ok(())
}

pub async fn logout(ctx: &AppContext, purge: bool, format: OutputFormat) -> UbResult<()> {
    let previous = ctx.session.current();
    ctx.session.sign_out().await?;
    if purge {
        ctx.database.reset()?;
    }

    match format {
        OutputFormat::Json => super::print_json(&json!({ "signed_out": previous, "purged": purge })),
        OutputFormat::Text => match previous {
            Some(identity) => println!("  {} Signed out {identity}", style("OK").green().bold()),
            None => println!("  Nobody was signed in."),
        },
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext, format: OutputFormat) -> UbResult<()> {
    match format {
        OutputFormat::Json => super::print_json(&json!({ "identity": ctx.session.current() })),
        OutputFormat::Text => println!("{}", ctx.session.display_identity()),
    }
    Ok(())
}

pub async fn register(ctx: &AppContext, format: OutputFormat) -> UbResult<()> {
    println!("{}", style("New account").bold().underlined());

    let email = super::prompt("Email")?;
    let password = super::prompt_password("Password")?;
    let full_name = super::prompt("Full name")?;
    let phone = super::prompt_optional("Phone")?;
    let birth_date = super::prompt_optional("Birth date (YYYY-MM-DD)")?;
    let blood_index = Select::new()
        .with_prompt("Blood type")
        .items(BLOOD_TYPES)
        .default(0)
        .interact()
        .map_err(|e| UbError::Internal(e.to_string()))?;

    let form = RegistrationForm {
        email,
        password,
        full_name,
        phone,
        birth_date,
        blood_type: BLOOD_TYPES[blood_index].to_string(),
    };

    let pb = super::spinner("Registering...");
    let result = ctx.registration.register(&form).await;
    pb.finish_and_clear();

    match result {
        Ok(body) => {
            match format {
                OutputFormat::Json => super::print_json(&json!({
                    "registered": true,
                    "uid": ctx.registration.pending_uid(),
                    "response": body,
                })),
                OutputFormat::Text => println!(
                    "  {} Account registered for {}",
                    style("OK").green().bold(),
                    form.email
                ),
            }
            Ok(())
        }
        Err(e) => {
            let message = RegistrationService::describe_error(&e);
            match format {
                OutputFormat::Json => super::print_json(&json!({
                    "registered": false,
                    "uid": ctx.registration.pending_uid(),
                    "error": message,
                })),
                OutputFormat::Text => println!("  {} {message}", style("FAIL").red().bold()),
            }
            Err(e)
        }
    }
}

pub async fn reset_password(
    ctx: &AppContext,
    email: Option<String>,
    format: OutputFormat,
) -> UbResult<()> {
    let email = match email {
        Some(e) => e,
        None => super::prompt("Email")?,
    };

    let result = ctx.password_reset.send_reset(&email).await;
    match (&result, format) {
        (Ok(()), OutputFormat::Json) => super::print_json(&json!({ "sent": true })),
        (Ok(()), OutputFormat::Text) => println!(
            "  {} Reset link sent to {}",
            style("OK").green().bold(),
            email.trim()
        ),
        (Err(e), OutputFormat::Json) => super::print_json(&json!({
            "sent": false,
            "error": PasswordResetService::describe_error(e),
        })),
        (Err(e), OutputFormat::Text) => println!(
            "  {} {}",
            style("FAIL").red().bold(),
            PasswordResetService::describe_error(e)
        ),
    }
    result
}
