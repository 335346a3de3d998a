use std::convert::Infallible;

use iced::{
    Element, Task,
    widget::{button, column, row, text},
};

use crate::{
    core::property::{DashboardSummary, today},
    gui::{
        AppState, Destination,
        screens::{Screen, ScreenMessage},
        widgets::{card, layout},
    },
    valuation::format_sek,
};

#[derive(Debug, Clone)]
pub struct DashboardScreen;

#[derive(Debug, Clone)]
pub enum ParentMessage {
    Open(Destination),
}

fn days(value: Option<i64>) -> String {
    value.map_or_else(|| "–".to_string(), |d| d.to_string())
}

impl Screen for DashboardScreen {
    type Message = Infallible;
    type ParentMessage = ParentMessage;

    fn view<'a>(&'a self, state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let record = &state.record;
        let summary = DashboardSummary::compute(record, today());
        let open = |destination| ScreenMessage::ParentMessage(ParentMessage::Open(destination));

        let figures = row![
            card(
                "Månadshyra",
                format_sek(u64::from(summary.monthly_rent)),
                text(if summary.rent_paid { "Betald" } else { "Obetald" }),
            ),
            card(
                "Uthyrningsgrad",
                format!("{}%", summary.occupancy_percent),
                text(record.tenant_status.as_str()),
            ),
            card(
                "Dagar till BRF-förnyelse",
                days(summary.days_to_permit_expiry),
                text(record.brf_permit_expiry.as_str()),
            ),
            card(
                "Olästa meddelanden",
                summary.unread_messages.to_string(),
                text(record.last_message.as_str()),
            ),
        ]
        .spacing(16);

        let details = column![
            text(format!("{} · {}", record.property_type, record.address)).size(18),
            text(format!("Hyresgäst: {}", record.tenant_name)),
            text(format!("Inflyttning: {}", record.move_in_date)),
            text(format!(
                "Nästa hyra: {} ({} dagar)",
                record.next_rent_due,
                days(summary.days_until_rent_due)
            )),
        ]
        .spacing(6);

        let warnings: Vec<Element<'a, ScreenMessage<Self>>> = record
            .date_warnings()
            .into_iter()
            .map(|warning| text(format!("Varning: {}", warning)).into())
            .collect();
        let warnings = column(warnings).spacing(4);

        layout(
            "Översikt",
            row![
                button("Redigera uppgifter").on_press(open(Destination::Settings)),
                button("Fastighetsvärdering").on_press(open(Destination::Valuation)),
            ]
            .spacing(10),
            column![figures, details, warnings].spacing(20),
        )
    }

    fn update(
        &mut self,
        message: Self::Message,
        _state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {}
    }
}
