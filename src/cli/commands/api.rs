use clap::Args;
use reqwest::Method;
use serde_json::Value;

use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::console::Console;
use crate::types::Subsystem;

#[derive(Args)]
pub struct ApiArgs {
    #[arg(help = "Subsystem (kesiswaan, keuangan, perpustakaan, akademik)")]
    pub subsystem: Subsystem,
    #[arg(help = "HTTP method")]
    pub method: String,
    #[arg(help = "Path below the subsystem's API root, e.g. students?page=2")]
    pub path: String,
    #[arg(long, help = "JSON request body")]
    pub data: Option<String>,
}

pub async fn handle(args: ApiArgs, console: &Console, output_format: OutputFormat) -> anyhow::Result<()> {
    require_session(console)?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())?;
    let body: Option<Value> = args.data.as_deref().map(|raw| serde_json::from_str::<Value>(raw)).transpose()?;

    let client = console.client(args.subsystem)?;
    let response = client.send(method, &args.path, body.as_ref()).await?;
    output_value(&output_format, &response)
}
