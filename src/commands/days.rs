use anyhow::{Result, bail};
use synchearts_core::schedule::today;

use crate::app::App;
use crate::render::{Render, render_days, render_legend};

pub async fn run(app: &App, surprise: bool) -> Result<()> {
    let session = app.require_session()?;
    if surprise && session.role.can_edit() {
        bail!("Surprise mode is only available when planning");
    }

    let calendar = app.open_calendar(&session).await;
    let dates = calendar.orchestrator().window();

    println!("{}  {}", session.role.render(), calendar.source().render());
    println!();
    println!(
        "{}",
        render_days(&calendar.document(), &dates, today(), surprise)
    );
    println!();
    println!("{}", render_legend());

    calendar.close();
    Ok(())
}
