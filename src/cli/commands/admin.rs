use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::console::Console;

#[derive(Subcommand)]
pub enum AdminCommands {
    #[command(about = "Authenticate as super-admin on the finance backend")]
    Login {
        #[arg(help = "Super-admin email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Act as super-admin with the stored elevated token")]
    On,

    #[command(about = "Act as the normal admin, keeping the elevated token")]
    Off,

    #[command(about = "End the super-admin session")]
    Logout,

    #[command(about = "Show super-admin state")]
    Status,
}

pub async fn handle(cmd: AdminCommands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    let mode = console.super_admin_mode();

    match cmd {
        AdminCommands::Login { email, password } => {
            require_session(console)?;
            let password = resolve_password(password)?;
            let session = mode.elevate(&email, &password).await?;
            output_success(
                &output_format,
                &format!("Super-admin mode enabled for {}", email),
                Some(json!({ "super_admin_email": session.super_admin_email })),
            )
        }
        AdminCommands::On => {
            if !mode.enter() {
                anyhow::bail!("No elevated token stored. Run `school admin login <email>` first");
            }
            output_success(&output_format, "Acting as super-admin", None)
        }
        AdminCommands::Off => {
            if !mode.leave() {
                anyhow::bail!("No elevated token stored");
            }
            output_success(&output_format, "Acting as normal admin", None)
        }
        AdminCommands::Logout => {
            mode.logout().await;
            output_success(&output_format, "Super-admin session ended", None)
        }
        AdminCommands::Status => {
            let session = mode.session();
            output_value(
                &output_format,
                &json!({
                    "is_super_admin": session.is_super_admin,
                    "has_token": session.super_admin_token.is_some(),
                    "email": session.super_admin_email,
                }),
            )
        }
    }
}
