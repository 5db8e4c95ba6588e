use iced::widget::{column, text, text_editor};
use iced::Element;

use crate::Message;

pub fn view<'a>(editor: &'a text_editor::Content) -> Element<'a, Message> {
    column![
        text("Request headers, one `Name: Value` per line").size(14),
        text_editor(editor)
            .on_action(Message::HeadersEdited)
            .height(130)
            .style(super::style::editor_style),
    ]
    .spacing(6)
    .into()
}
