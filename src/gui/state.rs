use std::path::PathBuf;

use iced::Task;

use crate::core::db::{PortalDb, WriteOrder};
use crate::core::property::PropertyRepository;
use crate::core::session::SessionStore;
use crate::gui::Message;
use crate::models::{PropertyRecord, SessionIdentity};

/// What the loading screen hands over once the database is open.
#[derive(Debug, Clone)]
pub struct LoadedState {
    pub store: PortalDb,
    pub user: Option<SessionIdentity>,
    pub record: PropertyRecord,
}

impl LoadedState {
    pub async fn load(db: PathBuf) -> anyhow::Result<Self> {
        let store = PortalDb::open(&db).await?;
        let user = SessionStore::new(store.clone()).init().await?;
        let record = PropertyRepository::new(store.clone())
            .load_or_default()
            .await?;
        Ok(Self {
            store,
            user,
            record,
        })
    }
}

#[derive(Debug, Default)]
pub struct AppState {
    pub store: Option<PortalDb>,
    pub user: Option<SessionIdentity>,
    pub record: PropertyRecord,
    /// Last persistence failure, shown in the header.
    pub notice: Option<String>,
    record_writes: WriteOrder,
    session_writes: WriteOrder,
}

impl AppState {
    pub fn apply(&mut self, loaded: LoadedState) {
        self.store = Some(loaded.store);
        self.user = loaded.user;
        self.record = loaded.record;
    }

    pub fn save_record(&self) -> Task<Message> {
        let Some(store) = self.store.clone() else {
            return Task::none();
        };
        let record = self.record.clone();
        let writes = self.record_writes.clone();
        let ticket = writes.ticket();
        Task::perform(
            async move {
                let repository = PropertyRepository::new(store);
                writes
                    .commit(ticket, repository.save(&record))
                    .await
                    .map(|_| ())
            },
            |result| Message::Persisted(result.map_err(|e| format!("{:#}", e))),
        )
    }

    pub fn sign_in(&mut self, identity: SessionIdentity) -> Task<Message> {
        self.user = Some(identity.clone());
        let Some(store) = self.store.clone() else {
            return Task::none();
        };
        let writes = self.session_writes.clone();
        let ticket = writes.ticket();
        Task::perform(
            async move {
                let mut sessions = SessionStore::new(store);
                writes
                    .commit(ticket, sessions.sign_in(identity))
                    .await
                    .map(|_| ())
            },
            |result| Message::Persisted(result.map_err(|e| format!("{:#}", e))),
        )
    }

    pub fn sign_out(&mut self) -> Task<Message> {
        self.user = None;
        let Some(store) = self.store.clone() else {
            return Task::none();
        };
        let writes = self.session_writes.clone();
        let ticket = writes.ticket();
        Task::perform(
            async move {
                let mut sessions = SessionStore::new(store);
                writes.commit(ticket, sessions.sign_out()).await.map(|_| ())
            },
            |result| Message::Persisted(result.map_err(|e| format!("{:#}", e))),
        )
    }
}
