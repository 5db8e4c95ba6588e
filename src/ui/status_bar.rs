use iced::alignment::Alignment;
use iced::widget::{button, column, container, horizontal_space, row, text, Row};
use iced::{Element, Length};

use crate::status::{render_status, LinkAction, Status, StatusSegment};
use crate::Message;

use super::style;

pub fn view<'a>(status: &Status, graph_url: &str) -> Element<'a, Message> {
    let rendered = render_status(status, graph_url);
    let color = style::message_type_color(rendered.message_type);

    let mut message = Row::new().spacing(0).align_y(Alignment::Center);
    for segment in rendered.segments {
        message = match segment {
            StatusSegment::Text(value) => message.push(text(value).size(12).color(color)),
            StatusSegment::Link { url, action } => {
                let label = match action {
                    LinkAction::LoadQuery => url.clone(),
                    LinkAction::OpenExternal => format!("{url} ↗"),
                };
                message.push(
                    button(text(label).size(12).color(style::INFO))
                        .on_press(Message::StatusLinkPressed { url, action })
                        .padding([0, 2])
                        .style(style::ghost_button),
                )
            }
        };
    }

    let mut content = column![message].spacing(4);
    if let Some(hint) = rendered.hint {
        content = content.push(text(hint).size(11).style(style::muted_text));
    }

    let dismiss = button(text("✕").size(11))
        .on_press(Message::StatusDismissed)
        .padding([4, 6])
        .style(style::ghost_button);

    container(
        row![content, horizontal_space(), dismiss]
            .spacing(8)
            .align_y(Alignment::Center),
    )
    .padding([6, 12])
    .width(Length::Fill)
    .style(|theme| style::surface_style(theme, style::Layer::Raised, 0.0))
    .into()
}
