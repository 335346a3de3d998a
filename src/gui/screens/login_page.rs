use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, container, text},
};
use tracing::warn;

use crate::{
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
    },
    login::{LoginEvent, LoginFlow, LoginStep, TokioClock},
    models::SessionIdentity,
};

/// The BankID sign-in dialog.
///
/// Every started attempt gets its own number so that ticks scheduled for a
/// cancelled attempt are ignored when they arrive.
#[derive(Debug, Default)]
pub struct LoginPageScreen {
    flow: LoginFlow<TokioClock>,
    attempt: u64,
    reason: Option<String>,
}

#[derive(Debug, Clone)]
pub enum LoginPageMessage {
    Start,
    Cancel,
    Tick(u64),
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    LoggedIn(SessionIdentity),
    Back,
}

impl LoginPageScreen {
    fn schedule_tick(&self) -> Task<ScreenMessage<Self>> {
        let Some(deadline) = self.flow.next_deadline() else {
            return Task::none();
        };
        let attempt = self.attempt;
        Task::perform(tokio::time::sleep_until(deadline), move |_| {
            ScreenMessage::ScreenMessage(LoginPageMessage::Tick(attempt))
        })
    }
}

impl Screen for LoginPageScreen {
    type Message = LoginPageMessage;
    type ParentMessage = ParentMessage;

    fn view<'a>(&'a self, _state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let step = self.flow.step();
        let mut content = column![text(step.heading()).size(28), text(step.hint())]
            .spacing(16)
            .align_x(Center);

        match step {
            LoginStep::Initial => {
                if let Some(reason) = &self.reason {
                    content = content.push(text(reason.as_str()));
                }
                content = content
                    .push(
                        button("Logga in med BankID")
                            .on_press(ScreenMessage::ScreenMessage(LoginPageMessage::Start)),
                    )
                    .push(
                        button("Tillbaka")
                            .on_press(ScreenMessage::ParentMessage(ParentMessage::Back)),
                    );
            }
            LoginStep::Qr => {
                if let Some(order_ref) = self.flow.order_ref() {
                    content = content.push(text(format!("Order: {}", order_ref)).size(12));
                }
                content = content.push(
                    button("Avbryt")
                        .on_press(ScreenMessage::ScreenMessage(LoginPageMessage::Cancel)),
                );
            }
            LoginStep::Waiting => {
                content = content.push(text("..."));
            }
            LoginStep::Success => {}
        }

        container(content.max_width(480.0))
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            LoginPageMessage::Start => match self.flow.start() {
                Ok(_) => {
                    self.attempt += 1;
                    self.reason = None;
                    self.schedule_tick()
                }
                Err(e) => {
                    warn!("Ignoring login start: {}", e);
                    Task::none()
                }
            },
            LoginPageMessage::Cancel => {
                if let Err(e) = self.flow.cancel() {
                    warn!("Ignoring login cancel: {}", e);
                }
                Task::none()
            }
            LoginPageMessage::Tick(attempt) if attempt != self.attempt => Task::none(),
            LoginPageMessage::Tick(_) => {
                for event in self.flow.poll() {
                    match event {
                        LoginEvent::Completed(identity) => {
                            return Task::done(ScreenMessage::ParentMessage(
                                ParentMessage::LoggedIn(identity),
                            ));
                        }
                        LoginEvent::Reset { reason } => self.reason = Some(reason),
                        LoginEvent::StepChanged { .. } => {}
                    }
                }
                self.schedule_tick()
            }
        }
    }
}
