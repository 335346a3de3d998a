use iced::{
    Alignment::Center,
    Element, Length, Theme, border,
    widget::{column, container, container::bordered_box, row, scrollable, text},
};

/// A bordered key figure, e.g. the monthly rent on the dashboard.
pub fn card<'a, Message>(
    title: &'a str,
    value: String,
    caption: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: 'a,
{
    container(column![text(title).size(14), text(value).size(26), caption.into()].spacing(6))
        .style(|theme: &Theme| bordered_box(theme).border(border::rounded(8.0).width(1.0)))
        .padding(16)
        .width(Length::Fill)
        .into()
}

/// Titled page body with the actions to the right of the heading.
pub fn layout<'a, Message>(
    title: &'a str,
    actions: impl Into<Element<'a, Message>>,
    body: impl Into<Element<'a, Message>>,
) -> Element<'a, Message>
where
    Message: 'a,
{
    container(scrollable(
        column![
            row![text(title).size(28), container(actions.into()).align_right(Length::Fill)]
                .align_y(Center),
            body.into(),
        ]
        .spacing(20)
        .padding(24),
    ))
    .width(Length::Fill)
    .height(Length::Fill)
    .into()
}
