use iced::widget::{button, column, container, horizontal_rule, row, text, text_editor};
use iced::{Element, Length};

use crate::state::AppState;
use crate::{Message, RequestEditorTab};

use super::style;

pub struct RequestEditorState<'a> {
    pub active_tab: RequestEditorTab,
    pub headers_editor: &'a text_editor::Content,
    pub body_editor: &'a text_editor::Content,
    pub state: &'a AppState,
}

pub fn view<'a>(state: RequestEditorState<'a>) -> Element<'a, Message> {
    let tabs = row![
        tab_button("Request headers", RequestEditorTab::Headers, state.active_tab),
        tab_button("Request body", RequestEditorTab::Body, state.active_tab),
        tab_button("Modify permissions", RequestEditorTab::Permissions, state.active_tab),
    ]
    .height(36)
    .spacing(0);

    let body: Element<'a, Message> = match state.active_tab {
        RequestEditorTab::Headers => super::headers_editor::view(state.headers_editor),
        RequestEditorTab::Body => super::body_editor::view(state.body_editor),
        RequestEditorTab::Permissions => super::permissions_panel::scopes_view(state.state),
    };

    column![
        container(tabs)
            .style(|theme| style::flat_surface_style(theme, style::Layer::Panel)),
        horizontal_rule(1).style(style::divider),
        container(body)
            .padding(12)
            .height(Length::Fill)
            .style(|theme| style::flat_surface_style(theme, style::Layer::Panel))
    ]
    .height(Length::Fill)
    .spacing(0)
    .into()
}

fn tab_button<'a>(
    label: &'a str,
    tab: RequestEditorTab,
    active: RequestEditorTab,
) -> iced::widget::Button<'a, Message> {
    let is_active = tab == active;
    button(
        column![
            container(text(label).size(12).style(move |theme| style::tab_label(is_active, theme)))
                .padding([8, 14])
                .center_y(Length::Fill),
            container(text("").size(2))
                .height(2)
                .width(Length::Fill)
                .style(move |theme| style::tab_indicator(is_active, theme)),
        ]
        .height(Length::Fill)
    )
    .on_press(Message::RequestTabSelected(tab))
    .padding(0)
    .style(move |theme, status| style::section_tab_button(is_active, theme, status))
}
