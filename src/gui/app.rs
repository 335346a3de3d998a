use std::path::PathBuf;

use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, row, text},
};
use tracing::{error, warn};

use crate::gui::{
    AppState, Destination, Message,
    screens::{ScreenData, loading_page::LoadingPageScreen},
    state::LoadedState,
};

pub struct PortalApp {
    screen: ScreenData,
    state: AppState,
}

impl PortalApp {
    pub fn new(db: PathBuf) -> (Self, Task<Message>) {
        (
            Self {
                screen: ScreenData::LoadingPage(LoadingPageScreen::default()),
                state: AppState::default(),
            },
            Task::perform(LoadedState::load(db), |result| {
                Message::Loaded(result.map_err(|e| format!("{:#}", e)))
            }),
        )
    }

    pub fn title(&self) -> String {
        match &self.state.user {
            Some(user) => format!("Fastighetsportal · {}", user.name),
            None => "Fastighetsportal".to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Loaded(Ok(loaded)) => {
                self.state.apply(loaded);
                let destination = if self.state.user.is_some() {
                    Destination::Dashboard
                } else {
                    Destination::Landing
                };
                self.navigate(destination)
            }
            Message::Loaded(Err(e)) => {
                error!("Failed to load portal state: {}", e);
                self.screen = ScreenData::LoadingPage(LoadingPageScreen::failed(e));
                Task::none()
            }
            Message::Navigate(destination) => self.navigate(destination),
            Message::Logout => {
                let task = self.state.sign_out();
                task.chain(Task::done(Message::Navigate(Destination::Landing)))
            }
            Message::Persisted(Ok(())) => {
                self.state.notice = None;
                Task::none()
            }
            Message::Persisted(Err(e)) => {
                warn!("Failed to persist: {}", e);
                self.state.notice = Some(e);
                Task::none()
            }
            message => self.screen.update(message, &mut self.state),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let mut header = row![text("Fastighetsportal").size(22)]
            .spacing(16)
            .padding(12)
            .align_y(Center);
        if let Some(notice) = &self.state.notice {
            header = header.push(text(format!("Kunde inte spara: {}", notice)).size(12));
        }
        if let Some(user) = &self.state.user {
            header = header.push(
                container(
                    row![
                        text(user.name.as_str()),
                        button("Översikt").on_press(Message::Navigate(Destination::Dashboard)),
                        button("Logga ut").on_press(Message::Logout),
                    ]
                    .spacing(10)
                    .align_y(Center),
                )
                .align_right(Length::Fill),
            );
        }

        column![header, self.screen.view(&self.state)].into()
    }

    /// Pages behind the login fall back to the login dialog.
    fn navigate(&mut self, destination: Destination) -> Task<Message> {
        let destination = match destination {
            Destination::Dashboard | Destination::Settings | Destination::Valuation
                if self.state.user.is_none() =>
            {
                Destination::Login
            }
            destination => destination,
        };
        let (screen, task) = ScreenData::open(destination, &self.state);
        self.screen = screen;
        task
    }
}
