use std::convert::Infallible;

use iced::{
    Alignment::Center,
    Element, Task,
    widget::{column, container, text},
};

use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
};

#[derive(Debug, Clone, Default)]
pub struct LoadingPageScreen {
    error: Option<String>,
}

impl LoadingPageScreen {
    pub fn failed(error: String) -> Self {
        Self { error: Some(error) }
    }
}

impl Screen for LoadingPageScreen {
    type Message = Infallible;
    type ParentMessage = Infallible;

    fn view<'a>(&'a self, _state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let content: Element<'a, ScreenMessage<Self>> = match &self.error {
            None => text("Laddar...").into(),
            Some(error) => column![
                text("Kunde inte öppna databasen").size(24),
                text(error.as_str()),
            ]
            .spacing(10)
            .align_x(Center)
            .into(),
        };

        container(content)
            .center_x(iced::Length::Fill)
            .center_y(iced::Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {}
    }
}
