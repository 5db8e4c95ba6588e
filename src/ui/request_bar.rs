use iced::widget::{button, pick_list, row, text, text_input};
use iced::{Element, Length};

use crate::http::method::HttpMethod;
use crate::query::Query;
use crate::Message;

use super::style;

pub fn view<'a>(query: &Query, running: bool) -> Element<'a, Message> {
    let method_picklist = pick_list(
        &HttpMethod::ALL[..],
        Some(query.selected_verb),
        Message::MethodSelected,
    )
    .width(110)
    .padding(10)
    .style(style::pick_list_style);

    let version = text(query.selected_version.clone())
        .size(12)
        .style(style::muted_text);

    let url_input = text_input("https://graph.microsoft.com/v1.0/me", &query.sample_url)
        .on_input(Message::UrlChanged)
        .on_submit(Message::SendPressed)
        .padding(10)
        .size(15)
        .width(Length::Fill)
        .style(style::input_style);

    let run_button = if running {
        button(text("Running...")).padding(10).style(style::primary_button)
    } else {
        button(text("Run query"))
            .on_press(Message::SendPressed)
            .padding(10)
            .style(style::primary_button)
    };

    let collect_button = button(text("Add to collection"))
        .on_press(Message::AddToCollectionPressed)
        .padding(10)
        .style(style::subtle_button);

    row![method_picklist, version, url_input, run_button, collect_button]
        .spacing(10)
        .align_y(iced::alignment::Alignment::Center)
        .into()
}
