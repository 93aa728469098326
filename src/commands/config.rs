use anyhow::Result;
use owo_colors::OwoColorize;
use synchearts_core::config::AppConfig;

use crate::app::App;

pub fn run(app: &App) -> Result<()> {
    let config_path = AppConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Data:    {}", app.config.data_path().display());

    println!();
    println!("{}", "Settings".bold());
    println!("  Window:        {} days", app.config.window_days);
    println!("  Poll interval: {}s", app.config.poll_interval().as_secs());
    println!("  Log level:     {}", app.config.log_level);

    println!();
    println!("{}", "Session".bold());
    match app.sessions().current() {
        Some(session) => {
            println!("  Couple key:  {}", session.couple_key);
            println!("  Role:        {}", session.role);
        }
        None => println!("  {}", "Not logged in".dimmed()),
    }

    let remote = match app.local.load_remote_config() {
        Some(remote) => remote.url,
        None => "none".dimmed().to_string(),
    };
    println!("  Remote:      {}", remote);

    Ok(())
}
