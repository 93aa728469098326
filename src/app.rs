use std::sync::Arc;

use anyhow::{Result, bail};
use synchearts_core::config::AppConfig;
use synchearts_core::local::{FileStore, LocalStore};
use synchearts_core::remote::RemoteMirror;
use synchearts_core::{Session, SessionManager, SharedCalendar, SyncOrchestrator};

use crate::utils::tui::create_spinner;

/// Everything a command needs, built once from the config.
pub struct App {
    pub config: AppConfig,
    pub local: LocalStore,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let store = FileStore::new(config.data_path());
        App {
            local: LocalStore::new(Arc::new(store)),
            config,
        }
    }

    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.local.clone())
    }

    pub fn require_session(&self) -> Result<Session> {
        match self.sessions().current() {
            Some(session) => Ok(session),
            None => bail!("Not logged in. Run `synchearts login <couple-key> --role share|plan` first."),
        }
    }

    pub fn orchestrator(&self) -> SyncOrchestrator {
        let remote_config = self.local.load_remote_config();
        let remote = RemoteMirror::from_config(remote_config.as_ref(), self.config.poll_interval());

        SyncOrchestrator::new(self.local.clone(), remote).with_window_days(self.config.window_days)
    }

    pub async fn open_calendar(&self, session: &Session) -> SharedCalendar {
        let orchestrator = self.orchestrator();
        let spinner = create_spinner("Loading schedule".to_string());
        let calendar = SharedCalendar::open(orchestrator, &session.couple_key).await;
        spinner.finish_and_clear();
        calendar
    }
}
