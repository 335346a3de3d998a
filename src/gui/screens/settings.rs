use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, row, text, text_input},
};

use crate::{
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::layout,
    },
    models::{PropertyField, PropertyRecord},
};

/// Form over every property field.
///
/// The text boxes hold drafts so a half-typed rent can be shown while it does
/// not parse yet; the record only changes once a draft is valid.
#[derive(Debug, Clone)]
pub struct SettingsScreen {
    drafts: Vec<String>,
    errors: Vec<Option<String>>,
}

#[derive(Debug, Clone)]
pub enum SettingsMessage {
    Edit(PropertyField, String),
    Reset,
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    RecordChanged,
    Back,
}

impl SettingsScreen {
    pub fn new(record: &PropertyRecord) -> Self {
        Self {
            drafts: PropertyField::ALL
                .iter()
                .map(|field| record.get_field(*field))
                .collect(),
            errors: vec![None; PropertyField::ALL.len()],
        }
    }

    fn index(field: PropertyField) -> usize {
        PropertyField::ALL
            .iter()
            .position(|f| *f == field)
            .unwrap_or_default()
    }

    fn field_row(&self, field: PropertyField) -> Element<'_, ScreenMessage<Self>> {
        let i = Self::index(field);
        let edit = move |value: &str| {
            ScreenMessage::ScreenMessage(SettingsMessage::Edit(field, value.to_string()))
        };

        let input: Element<'_, ScreenMessage<Self>> = if field == PropertyField::RentReceived {
            row![
                button("Ja").on_press(edit("ja")),
                button("Nej").on_press(edit("nej")),
                text(if self.drafts[i] == "true" { "Betald" } else { "Obetald" }),
            ]
            .spacing(10)
            .align_y(Center)
            .into()
        } else {
            let placeholder = if field.is_date() { "ÅÅÅÅ-MM-DD" } else { "" };
            text_input(placeholder, &self.drafts[i])
                .on_input(move |value| {
                    ScreenMessage::ScreenMessage(SettingsMessage::Edit(field, value))
                })
                .into()
        };

        let mut line = row![text(field.label()).width(Length::Fixed(220.0)), input]
            .spacing(12)
            .align_y(Center);
        if let Some(error) = &self.errors[i] {
            line = line.push(text(error.as_str()).size(12));
        }
        line.into()
    }
}

impl Screen for SettingsScreen {
    type Message = SettingsMessage;
    type ParentMessage = ParentMessage;

    fn view<'a>(&'a self, _state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        layout(
            "Fastighetsuppgifter",
            row![
                button("Återställ").on_press(ScreenMessage::ScreenMessage(SettingsMessage::Reset)),
                button("Tillbaka").on_press(ScreenMessage::ParentMessage(ParentMessage::Back)),
            ]
            .spacing(10),
            column(PropertyField::ALL.iter().map(|field| self.field_row(*field))).spacing(10),
        )
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            SettingsMessage::Edit(field, value) => {
                let i = Self::index(field);
                let result = state.record.set_field(field, &value);
                self.drafts[i] = value;
                match result {
                    Ok(()) => {
                        self.errors[i] = None;
                        if field == PropertyField::RentReceived {
                            self.drafts[i] = state.record.get_field(field);
                        }
                        Task::done(ScreenMessage::ParentMessage(ParentMessage::RecordChanged))
                    }
                    Err(e) => {
                        self.errors[i] = Some(format!("{:#}", e));
                        Task::none()
                    }
                }
            }
            SettingsMessage::Reset => {
                state.record = PropertyRecord::default();
                *self = Self::new(&state.record);
                Task::done(ScreenMessage::ParentMessage(ParentMessage::RecordChanged))
            }
        }
    }
}
