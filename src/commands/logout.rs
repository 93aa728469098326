use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let sessions = app.sessions();
    if sessions.current().is_none() {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    }

    sessions.logout()?;
    println!("Logged out. Your calendar stays saved on this device.");
    Ok(())
}
