use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::console::Console;
use crate::types::Subsystem;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to every subsystem (or just one)")]
    Login {
        #[arg(help = "Account email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
        #[arg(long, help = "Only log into this subsystem")]
        subsystem: Option<Subsystem>,
    },

    #[command(about = "Logout from every subsystem")]
    Logout,

    #[command(about = "Show which subsystems hold a token")]
    Status,

    #[command(about = "Fetch the current user from the primary backend")]
    Whoami,
}

pub async fn handle(cmd: AuthCommands, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password, subsystem } => {
            let password = resolve_password(password)?;
            match subsystem {
                Some(subsystem) => {
                    let response = console.auth().login(subsystem, &email, &password).await?;
                    output_success(
                        &output_format,
                        &format!("Logged into {} as {}", subsystem, email),
                        Some(json!({ "subsystem": subsystem, "user": response.user })),
                    )
                }
                None => {
                    let user = console.auth().login_all(&email, &password).await?;
                    output_success(
                        &output_format,
                        &format!("Logged into all subsystems as {}", email),
                        Some(json!({ "user": user })),
                    )
                }
            }
        }
        AuthCommands::Logout => {
            console.auth().logout().await;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let credentials = console.credentials().snapshot();
            let super_admin = console.super_admin().session();

            match output_format {
                OutputFormat::Json => {
                    let tokens: serde_json::Map<String, serde_json::Value> = Subsystem::ALL
                        .into_iter()
                        .map(|s| (s.key().to_string(), json!(credentials.token(s).is_some())))
                        .collect();
                    output_value(
                        &output_format,
                        &json!({
                            "tokens": tokens,
                            "user": credentials.user,
                            "super_admin": super_admin.is_super_admin,
                            "super_admin_email": super_admin.super_admin_email,
                        }),
                    )?;
                }
                OutputFormat::Text => {
                    println!("{:<15} {}", "SUBSYSTEM", "TOKEN");
                    println!("{}", "-".repeat(25));
                    for subsystem in Subsystem::ALL {
                        let marker = if credentials.token(subsystem).is_some() { "yes" } else { "no" };
                        println!("{:<15} {}", subsystem.key(), marker);
                    }
                    if let Some(user) = &credentials.user {
                        println!("User: {} <{}>", user.name, user.email);
                    }
                    if super_admin.is_super_admin {
                        println!(
                            "Super-admin: on ({})",
                            super_admin.super_admin_email.as_deref().unwrap_or("unknown")
                        );
                    }
                }
            }
            Ok(())
        }
        AuthCommands::Whoami => {
            require_session(console)?;
            let user = console.auth().fetch_profile().await?;
            output_value(&output_format, &serde_json::to_value(&user)?)
        }
    }
}
