use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::console::Console;
use crate::navigation::{Navigation, Navigator};
use crate::session::{FileCookieStore, FileStorage};

pub fn get_config_dir(app: &AppConfig) -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("SCHOOL_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else if let Some(dir) = &app.session.storage_dir {
        dir.clone()
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("smart-school").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

/// A terminal cannot follow a redirect, so tell the user where to go
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn navigate(&self, to: Navigation) {
        match &to {
            Navigation::External(url) => eprintln!("Session ended. Sign in again at {}", url),
            Navigation::Internal(path) => {
                eprintln!("Super-admin session ended. Re-authenticate with `school admin login` ({})", path)
            }
        }
        tracing::info!("Redirect to {}", to.target());
    }
}

/// Open the console over the on-disk session, reconciling elevation like a page load
pub fn open_console(app: AppConfig) -> anyhow::Result<Console> {
    let dir = get_config_dir(&app)?;
    let console = Console::open(
        Arc::new(app),
        Arc::new(FileStorage::new(&dir)),
        Arc::new(FileCookieStore::new(dir.join("cookies.json"))),
        Arc::new(TerminalNavigator),
    );
    console.super_admin_mode().mount();
    Ok(console)
}
