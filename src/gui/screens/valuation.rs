use iced::{
    Alignment::Center,
    Element, Length, Task,
    widget::{button, column, progress_bar, row, text},
};

use crate::{
    core::property::today,
    gui::{
        AppState,
        screens::{Screen, ScreenMessage},
        widgets::{card, layout},
    },
    models::PropertyRecord,
    valuation::{
        MarketTrend, REGIONAL_RENTAL_YIELD, ValuationPeriod, ValuationReport, ValuationService,
        format_sek, format_sqm_price,
    },
};

#[derive(Debug, Clone)]
pub struct ValuationScreen {
    period: ValuationPeriod,
    /// Bumped on every request; stale reports are dropped.
    request: u64,
    report: Option<ValuationReport>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ValuationMessage {
    SelectPeriod(ValuationPeriod),
    Loaded(u64, Result<ValuationReport, String>),
}

#[derive(Debug, Clone)]
pub enum ParentMessage {
    Back,
}

impl ValuationScreen {
    pub fn new(record: &PropertyRecord) -> (Self, Task<ScreenMessage<Self>>) {
        let mut screen = Self {
            period: ValuationPeriod::default(),
            request: 0,
            report: None,
            error: None,
        };
        let task = screen.fetch(record);
        (screen, task)
    }

    fn fetch(&mut self, record: &PropertyRecord) -> Task<ScreenMessage<Self>> {
        self.request += 1;
        self.report = None;
        self.error = None;

        let request = self.request;
        let period = self.period;
        let record = record.clone();
        Task::perform(
            async move {
                ValuationService::new()
                    .load(&record, period, today())
                    .await
            },
            move |result| {
                ScreenMessage::ScreenMessage(ValuationMessage::Loaded(
                    request,
                    result.map_err(|e| format!("{:#}", e)),
                ))
            },
        )
    }

    fn chart(report: &ValuationReport) -> Element<'_, ScreenMessage<Self>> {
        let max = report.series.iter().map(|p| p.value).max().unwrap_or(1).max(1) as f32;
        let rows: Vec<Element<'_, ScreenMessage<Self>>> = report
            .series
            .iter()
            .map(|point| {
                row![
                    text(point.display_month.as_str()).width(Length::Fixed(80.0)),
                    progress_bar(0.0..=max, point.value as f32),
                    text(format_sek(point.value)).width(Length::Fixed(130.0)),
                ]
                .spacing(10)
                .align_y(Center)
                .into()
            })
            .collect();
        column(rows).spacing(4).into()
    }
}

impl Screen for ValuationScreen {
    type Message = ValuationMessage;
    type ParentMessage = ParentMessage;

    fn view<'a>(&'a self, _state: &'a AppState) -> Element<'a, ScreenMessage<Self>> {
        let choices: Vec<Element<'a, ScreenMessage<Self>>> = ValuationPeriod::ALL
            .iter()
            .map(|period| {
                let mut choice = button(text(period.label()));
                if *period != self.period {
                    choice = choice.on_press(ScreenMessage::ScreenMessage(
                        ValuationMessage::SelectPeriod(*period),
                    ));
                }
                choice.into()
            })
            .collect();
        let periods = row(choices).spacing(8);

        let body: Element<'a, ScreenMessage<Self>> = match (&self.report, &self.error) {
            (_, Some(error)) => text(format!("Kunde inte hämta värdering: {}", error)).into(),
            (None, None) => text("Hämtar värderingsdata...").into(),
            (Some(report), None) => {
                let comparison = &report.comparison;
                let arrow = match comparison.trend {
                    MarketTrend::Up => "↑",
                    MarketTrend::Down => "↓",
                };
                let sign = if comparison.year_change > 0.0 { "+" } else { "" };
                column![
                    text(report.address.as_str()),
                    row![
                        card(
                            "Aktuellt marknadsvärde",
                            format_sek(comparison.current_value),
                            text(format_sqm_price(
                                report.series.last().map_or(0, |p| p.sqm_price)
                            )),
                        ),
                        card(
                            "Årlig förändring",
                            format!("{}{:.1}% {}", sign, comparison.year_change, arrow),
                            text("jämfört med för 12 månader sedan"),
                        ),
                        card(
                            "Regionalt snitt",
                            format_sek(comparison.regional_average),
                            text(format!(
                                "Nationellt snitt {}",
                                format_sek(comparison.national_average)
                            )),
                        ),
                    ]
                    .spacing(16),
                    periods,
                    Self::chart(report),
                    text(format!(
                        "Hyresavkastning {:.1}% (regionalt snitt {:.1}%)",
                        report.rental_yield, REGIONAL_RENTAL_YIELD
                    )),
                ]
                .spacing(16)
                .into()
            }
        };

        layout(
            "Fastighetsvärdering",
            button("Tillbaka").on_press(ScreenMessage::ParentMessage(ParentMessage::Back)),
            body,
        )
    }

    fn update(
        &mut self,
        message: Self::Message,
        state: &mut AppState,
    ) -> Task<ScreenMessage<Self>> {
        match message {
            ValuationMessage::SelectPeriod(period) => {
                self.period = period;
                self.fetch(&state.record)
            }
            ValuationMessage::Loaded(request, _) if request != self.request => Task::none(),
            ValuationMessage::Loaded(_, Ok(report)) => {
                self.report = Some(report);
                Task::none()
            }
            ValuationMessage::Loaded(_, Err(e)) => {
                self.error = Some(e);
                Task::none()
            }
        }
    }
}
