use iced::alignment::Alignment;
use iced::widget::{button, container, horizontal_space, pick_list, row, text, text_input};
use iced::{Element, Length};

use crate::auth::UserProfile;
use crate::state::ThemeChoice;
use crate::Message;

use super::style;

pub struct HeaderState<'a> {
    pub sidebar_open: bool,
    pub theme: ThemeChoice,
    pub profile: Option<&'a UserProfile>,
    pub signed_in: bool,
    pub token_input: &'a str,
}

pub fn view<'a>(state: HeaderState<'a>) -> Element<'a, Message> {
    let sidebar_toggle = button(text(if state.sidebar_open { "◀" } else { "▶" }).size(14))
        .on_press(Message::SidebarTogglePressed)
        .padding([6, 10])
        .style(style::ghost_button);

    let theme_select = pick_list(&ThemeChoice::ALL[..], Some(state.theme), Message::ThemeSelected)
        .width(140)
        .style(style::pick_list_style)
        .padding([5, 8]);

    let account: Element<'a, Message> = if state.signed_in {
        let name = state
            .profile
            .map(|profile| profile.display_name.as_str())
            .unwrap_or("Signed in");
        row![
            text(name).size(12),
            button(text("Sign out").size(12))
                .on_press(Message::SignOutPressed)
                .padding([5, 10])
                .style(style::subtle_button),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    } else {
        row![
            text_input("Paste an access token", state.token_input)
                .on_input(Message::TokenInputChanged)
                .on_submit(Message::SignInPressed)
                .secure(true)
                .padding([5, 8])
                .size(12)
                .width(260)
                .style(style::input_style),
            button(text("Sign in").size(12))
                .on_press(Message::SignInPressed)
                .padding([5, 10])
                .style(style::primary_button),
        ]
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    };

    container(
        row![
            sidebar_toggle,
            text("Graph Explorer").size(16),
            text(format!("v{}", env!("CARGO_PKG_VERSION"))).size(10).style(style::muted_text),
            horizontal_space(),
            account,
            theme_select
        ]
        .spacing(8)
        .padding([5, 12])
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .style(|theme| style::surface_style(theme, style::Layer::Raised, 0.0))
    .into()
}
