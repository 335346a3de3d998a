pub mod dashboard;
pub mod landing_page;
pub mod loading_page;
pub mod login_page;
pub mod settings;
pub mod valuation;

use std::fmt;

use iced::{Element, Task};

use crate::gui::{AppState, Destination, Message};

pub enum ScreenMessage<S: Screen> {
    ScreenMessage(S::Message),
    ParentMessage(S::ParentMessage),
}

impl<S: Screen> Clone for ScreenMessage<S>
where
    S::Message: Clone,
    S::ParentMessage: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Self::ScreenMessage(msg) => Self::ScreenMessage(msg.clone()),
            Self::ParentMessage(msg) => Self::ParentMessage(msg.clone()),
        }
    }
}

impl<S: Screen> fmt::Debug for ScreenMessage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScreenMessage(msg) => f.debug_tuple("ScreenMessage").field(msg).finish(),
            Self::ParentMessage(msg) => f.debug_tuple("ParentMessage").field(msg).finish(),
        }
    }
}

pub trait Screen: Sized {
    type Message: fmt::Debug + Clone + Send + 'static;
    type ParentMessage: fmt::Debug + Clone + Send + 'static;
    fn view<'a>(&'a self, state: &'a AppState) -> Element<'a, ScreenMessage<Self>>;
    fn update(&mut self, message: Self::Message, state: &mut AppState)
    -> Task<ScreenMessage<Self>>;
}

#[derive(Debug)]
pub enum ScreenData {
    LoadingPage(loading_page::LoadingPageScreen),
    LandingPage(landing_page::LandingPageScreen),
    LoginPage(login_page::LoginPageScreen),
    Dashboard(dashboard::DashboardScreen),
    Settings(settings::SettingsScreen),
    Valuation(valuation::ValuationScreen),
}

impl ScreenData {
    /// Build the screen for `destination` together with whatever it needs to
    /// fetch on entry.
    pub fn open(destination: Destination, state: &AppState) -> (Self, Task<Message>) {
        match destination {
            Destination::Landing => (
                ScreenData::LandingPage(landing_page::LandingPageScreen::default()),
                Task::none(),
            ),
            Destination::Login => (
                ScreenData::LoginPage(login_page::LoginPageScreen::default()),
                Task::none(),
            ),
            Destination::Dashboard => (
                ScreenData::Dashboard(dashboard::DashboardScreen),
                Task::none(),
            ),
            Destination::Settings => (
                ScreenData::Settings(settings::SettingsScreen::new(&state.record)),
                Task::none(),
            ),
            Destination::Valuation => {
                let (screen, task) = valuation::ValuationScreen::new(&state.record);
                (ScreenData::Valuation(screen), task.map(Message::Valuation))
            }
        }
    }

    pub fn view<'a>(&'a self, state: &'a AppState) -> Element<'a, Message> {
        match self {
            ScreenData::LoadingPage(screen) => screen.view(state).map(Message::LoadingPage),
            ScreenData::LandingPage(screen) => screen.view(state).map(Message::LandingPage),
            ScreenData::LoginPage(screen) => screen.view(state).map(Message::LoginPage),
            ScreenData::Dashboard(screen) => screen.view(state).map(Message::Dashboard),
            ScreenData::Settings(screen) => screen.view(state).map(Message::Settings),
            ScreenData::Valuation(screen) => screen.view(state).map(Message::Valuation),
        }
    }

    pub fn update(&mut self, message: Message, state: &mut AppState) -> Task<Message> {
        match (self, message) {
            (ScreenData::LandingPage(page), Message::LandingPage(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => {
                    page.update(msg, state).map(Message::LandingPage)
                }
                ScreenMessage::ParentMessage(landing_page::ParentMessage::TryDemo) => {
                    let destination = if state.user.is_some() {
                        Destination::Dashboard
                    } else {
                        Destination::Login
                    };
                    Task::done(Message::Navigate(destination))
                }
            },
            (ScreenData::LoginPage(page), Message::LoginPage(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page.update(msg, state).map(Message::LoginPage),
                ScreenMessage::ParentMessage(login_page::ParentMessage::LoggedIn(identity)) => {
                    Task::batch([
                        state.sign_in(identity),
                        Task::done(Message::Navigate(Destination::Dashboard)),
                    ])
                }
                ScreenMessage::ParentMessage(login_page::ParentMessage::Back) => {
                    Task::done(Message::Navigate(Destination::Landing))
                }
            },
            (ScreenData::Dashboard(page), Message::Dashboard(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page.update(msg, state).map(Message::Dashboard),
                ScreenMessage::ParentMessage(dashboard::ParentMessage::Open(destination)) => {
                    Task::done(Message::Navigate(destination))
                }
            },
            (ScreenData::Settings(page), Message::Settings(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page.update(msg, state).map(Message::Settings),
                ScreenMessage::ParentMessage(settings::ParentMessage::RecordChanged) => {
                    state.save_record()
                }
                ScreenMessage::ParentMessage(settings::ParentMessage::Back) => {
                    Task::done(Message::Navigate(Destination::Dashboard))
                }
            },
            (ScreenData::Valuation(page), Message::Valuation(msg)) => match msg {
                ScreenMessage::ScreenMessage(msg) => page.update(msg, state).map(Message::Valuation),
                ScreenMessage::ParentMessage(valuation::ParentMessage::Back) => {
                    Task::done(Message::Navigate(Destination::Dashboard))
                }
            },
            // Late results for a screen that has already been left.
            _ => Task::none(),
        }
    }
}
