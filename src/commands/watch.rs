use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use synchearts_core::ScheduleDocument;
use synchearts_core::schedule::{today, upcoming_date_keys_from};
use tracing::debug;

use crate::app::App;
use crate::render::{Render, render_days, render_legend};

pub async fn run(app: &App, surprise: bool) -> Result<()> {
    let session = app.require_session()?;
    if surprise && session.role.can_edit() {
        bail!("Surprise mode is only available when planning");
    }

    let mut calendar = app.open_calendar(&session).await;
    if !calendar.orchestrator().remote().is_configured() {
        bail!("No remote configured, nothing to watch. Set one with `synchearts remote set`.");
    }

    let mut watcher = calendar.watch();
    calendar.start_sync().await;
    if !calendar.is_syncing() {
        bail!("Could not subscribe to remote changes");
    }

    let header = format!("{}  {}", session.role.render(), calendar.source().render());
    let window_days = calendar.orchestrator().window_days();
    draw(&header, &watcher.borrow_and_update(), window_days, surprise);

    loop {
        tokio::select! {
            changed = watcher.changed() => {
                if changed.is_err() {
                    break;
                }
                debug!("schedule changed, redrawing");
                let doc = watcher.borrow_and_update().clone();
                draw(&header, &doc, window_days, surprise);
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    calendar.close();
    Ok(())
}

fn draw(header: &str, doc: &ScheduleDocument, window_days: usize, surprise: bool) {
    let today = today();
    let dates = upcoming_date_keys_from(today, window_days);

    // Clear screen, cursor home
    print!("\x1b[2J\x1b[H");
    println!("{}", header);
    println!();
    println!("{}", render_days(doc, &dates, today, surprise));
    println!();
    println!("{}", render_legend());
    println!();
    println!("{}", "Watching for changes, Ctrl-C to stop".dimmed());
}
