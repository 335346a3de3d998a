mod app;
mod message;
mod screens;
mod state;
mod widgets;

use std::path::PathBuf;

pub use app::PortalApp;
pub use message::{Destination, Message};
pub use state::AppState;

/// Open the desktop front end on the given database.
pub fn run(db: PathBuf) -> anyhow::Result<()> {
    iced::application(
        move || PortalApp::new(db.clone()),
        PortalApp::update,
        PortalApp::view,
    )
    .title(PortalApp::title)
    .run()?;
    Ok(())
}
