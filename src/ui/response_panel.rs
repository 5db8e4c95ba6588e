use iced::widget::{button, checkbox, column, container, row, scrollable, text};
use iced::{Element, Length};

use crate::http::response::HttpResponse;
use crate::{Message, ResponseTab};

use super::style;

pub fn view<'a>(
    response: Option<&'a HttpResponse>,
    running: bool,
    pretty_json: bool,
    active_tab: ResponseTab,
) -> Element<'a, Message> {
    let tabs = row![
        tab_button("Body", ResponseTab::Body, active_tab),
        tab_button("Headers", ResponseTab::Headers, active_tab),
    ]
    .spacing(0)
    .height(36);

    let mut section = column![tabs].spacing(0).height(Length::Fill);

    if let Some(response) = response {
        let status_line = text(format!("{} {}", response.status, response.status_text)).size(13);
        let status_line = match style::status_code_color(response.status) {
            Some(color) => status_line.color(color),
            None => status_line,
        };
        let summary = row![
            status_line,
            text(format!(
                " | {} ms | {} bytes",
                response.duration_ms, response.size_bytes
            ))
            .size(12)
            .style(style::muted_text),
            iced::widget::horizontal_space(),
            checkbox("Pretty JSON", pretty_json).on_toggle(Message::PrettyJsonToggled)
        ]
        .align_y(iced::alignment::Alignment::Center)
        .padding([8, 10])
        .spacing(10);

        let content: Element<'a, Message> = match active_tab {
            ResponseTab::Body => {
                let body_content = if pretty_json {
                    pretty_json_body(&response.body)
                } else {
                    response.body.clone()
                };
                scrollable(
                    container(text(body_content).size(13))
                        .padding(10)
                        .style(|theme| style::surface_style(theme, style::Layer::Raised, 8.0)),
                )
                .height(Length::Fill)
                .into()
            }
            ResponseTab::Headers => scrollable(
                container(text(&response.headers).size(13))
                    .padding(10)
                    .style(|theme| style::surface_style(theme, style::Layer::Raised, 8.0)),
            )
            .height(Length::Fill)
            .into(),
        };

        section = section.push(summary).push(container(content).padding(10).height(Length::Fill));
    } else {
        let placeholder = if running { "Running query..." } else { "Run a query to see the response" };
        let empty = column![text(placeholder).size(14).style(style::muted_text)]
            .height(Length::Fill)
            .width(Length::Fill)
            .align_x(iced::alignment::Horizontal::Center)
            .spacing(8);

        section = section.push(container(empty).height(Length::Fill).padding(16));
    }

    section.into()
}

fn tab_button<'a>(
    label: &'a str,
    tab: ResponseTab,
    active: ResponseTab,
) -> iced::widget::Button<'a, Message> {
    button(text(label).size(12))
        .on_press(Message::ResponseTabSelected(tab))
        .width(Length::Fill)
        .padding([8, 10])
        .style(move |theme, status| style::section_tab_button(tab == active, theme, status))
}

fn pretty_json_body(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}
