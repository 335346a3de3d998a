use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, row, scrollable, text, text_input},
};

use crate::gui::{
    AppState,
    screens::{Screen, ScreenMessage},
    widgets::card,
};

const FEATURES: [(&str, &str); 4] = [
    (
        "Live-uppdateringar",
        "Få notiser direkt när hyran betalas, hyresgästen flyttar in, eller BRF-tillstånd snart upphör.",
    ),
    (
        "Chatta med hyresgäster",
        "Kommunicera direkt med din hyresgäst i dashboarden med full historik.",
    ),
    (
        "BRF & Kontraktsverktyg",
        "Missa aldrig en förnyelse. Påminnelser och mallar för BRF-tillstånd och kontrakt.",
    ),
    (
        "Fast pris-modell",
        "Inga 15% mäklaravgifter. Bara ett lågt fast pris för full kontroll över uthyrningen.",
    ),
];

/// Plan name, price and what the price covers.
const PLANS: [(&str, &str, &str); 3] = [
    ("Grundpaket", "Gratis", "för alltid"),
    ("Hel-cykel", "4,990 kr", "per uthyrningscykel"),
    ("Företag", "Kontakta oss", "skräddarsydd lösning"),
];

#[derive(Debug, Clone, Default)]
pub struct LandingPageScreen {
    email: String,
    confirmation: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub enum LandingPageMessage {
    EmailChanged(String),
    Subscribe,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    TryDemo,
}

impl Screen for LandingPageScreen {
    type Message = LandingPageMessage;
    type ParentMessage = ParentMessage;

    fn view<'a>(&'a self, _state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let hero = column![
            text("Hyra ut smart – full kontroll, noll stress").size(40),
            text("Modern fastighetshantering med live-uppdateringar och smidig hyresgästkommunikation."),
            button("Testa demo").on_press(ScreenMessage::ParentMessage(ParentMessage::TryDemo)),
        ]
        .spacing(16)
        .align_x(Center);

        let features: Vec<Element<'a, ScreenMessage<Self>>> = FEATURES
            .iter()
            .map(|(title, body)| card(title, String::new(), text(*body)))
            .collect();
        let features = row(features).spacing(16);

        let plans: Vec<Element<'a, ScreenMessage<Self>>> = PLANS
            .iter()
            .map(|(name, price, terms)| card(name, price.to_string(), text(*terms)))
            .collect();
        let pricing = column![
            text("Transparent prissättning - inga dolda avgifter").size(24),
            row(plans).spacing(16),
        ]
        .spacing(16);

        let mut signup = column![
            text("Få en personlig genomgång").size(20),
            row![
                text_input("din@email.se", &self.email)
                    .on_input(|value| ScreenMessage::ScreenMessage(
                        LandingPageMessage::EmailChanged(value)
                    ))
                    .on_submit(ScreenMessage::ScreenMessage(LandingPageMessage::Subscribe)),
                button("Skicka")
                    .on_press(ScreenMessage::ScreenMessage(LandingPageMessage::Subscribe)),
            ]
            .spacing(10),
        ]
        .spacing(10);
        if let Some(confirmation) = self.confirmation {
            signup = signup.push(text(confirmation));
        }

        container(scrollable(
            column![hero, features, pricing, signup]
                .spacing(32)
                .padding(32)
                .max_width(900.0),
        ))
        .center_x(Length::Fill)
        .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            LandingPageMessage::EmailChanged(value) => {
                self.email = value;
                self.confirmation = None;
            }
            LandingPageMessage::Subscribe => {
                self.confirmation = Some(if self.email.contains('@') {
                    self.email.clear();
                    "Tack! Vi kontaktar dig inom 24 timmar."
                } else {
                    "Ange en giltig e-postadress."
                });
            }
        }
        Task::none()
    }
}
