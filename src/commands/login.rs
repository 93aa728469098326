use anyhow::Result;
use owo_colors::OwoColorize;
use synchearts_core::Role;

use crate::app::App;
use crate::render::Render;

pub async fn run(app: &App, couple_key: &str, role: Role) -> Result<()> {
    if let Some(previous) = app.sessions().current() {
        if previous.couple_key != couple_key.trim() || previous.role != role {
            println!("{}", "Replacing the previous session on this device".dimmed());
        }
    }

    let session = app.sessions().login(role, couple_key)?;
    let calendar = app.open_calendar(&session).await;

    println!("{}", session.role.render());
    println!(
        "Logged in to {} ({})",
        session.couple_key.bold(),
        calendar.source().render()
    );
    if session.role.can_edit() {
        println!("{}", "Change a day with `synchearts set today --evening free`".dimmed());
    } else {
        println!("{}", "Look for surprise windows with `synchearts days --surprise`".dimmed());
    }

    calendar.close();
    Ok(())
}
