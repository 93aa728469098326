use anyhow::Result;
use owo_colors::OwoColorize;
use synchearts_core::remote::{RemoteConfig, RestRemote};

use crate::app::App;

pub fn show(app: &App) -> Result<()> {
    match app.local.load_remote_config() {
        Some(remote) => {
            println!("{}", "Remote".bold());
            println!("  URL:    {}", remote.url);
            println!("  Key:    {}", remote.masked_key());
            println!("  Table:  {}", remote.table);
        }
        None => println!("{}", "No remote configured, data stays on this device".dimmed()),
    }
    Ok(())
}

pub fn set(app: &App, url: &str, key: &str, table: Option<&str>) -> Result<()> {
    let mut remote = RemoteConfig::new(url, key);
    if let Some(table) = table {
        remote = remote.with_table(table);
    }

    // Reject configs the HTTP client cannot use before storing them
    RestRemote::new(&remote, app.config.poll_interval())?;

    app.local.save_remote_config(&remote)?;
    println!("Remote set to {}", remote.url.bold());
    Ok(())
}

pub fn clear(app: &App) -> Result<()> {
    app.local.clear_remote_config()?;
    println!("Remote cleared. Data stays on this device only.");
    Ok(())
}
