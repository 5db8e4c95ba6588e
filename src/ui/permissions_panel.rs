//! Permission lists: the scopes the current query needs, and the full
//! catalog browsed from the sidebar.

use iced::alignment::Alignment;
use iced::widget::{column, container, horizontal_space, row, scrollable, text, text_input, Column};
use iced::{Color, Element, Length};

use crate::permissions::{Permission, PermissionsView};
use crate::state::AppState;
use crate::Message;

use super::style;

pub fn scopes_view(state: &AppState) -> Element<'_, Message> {
    if state.permissions.loading_scopes && state.permissions.scopes.is_empty() {
        return notice("Loading permissions...");
    }

    match state.permissions_view() {
        PermissionsView::NotSignedIn => notice("Sign in to see and consent to the permissions this query needs."),
        PermissionsView::NotFound => notice("Permissions for this query are not available."),
        PermissionsView::FetchFailed => notice("Permissions could not be loaded. Run the query again to retry."),
        PermissionsView::List { sign_in_hint } => {
            let mut list = Column::new().spacing(4);
            if sign_in_hint {
                list = list.push(
                    text("Sign in to see which of these permissions you have consented to.")
                        .size(12)
                        .color(style::WARNING),
                );
            }
            for permission in &state.permissions.scopes {
                list = list.push(permission_row(permission));
            }
            scrollable(list).height(Length::Fill).into()
        }
    }
}

pub fn catalog_view(state: &AppState) -> Element<'_, Message> {
    let search = text_input("Search permissions", &state.permissions.keyword)
        .on_input(Message::PermissionSearchChanged)
        .padding([6, 8])
        .size(12)
        .style(style::input_style);

    let mut list = Column::new().spacing(4);
    if let Some(err) = &state.permissions.full_error {
        list = list.push(text(err.to_string()).size(12).color(style::DANGER));
    }

    let (filtered, groups) = state.filtered_full_permissions();
    if filtered.is_empty() {
        list = list.push(text("No permissions").size(12).style(style::muted_text));
    }
    for group in groups {
        list = list.push(
            text(format!("{} ({})", group.name, group.count))
                .size(11)
                .style(style::muted_text),
        );
        for permission in &filtered[group.start_index..group.start_index + group.count] {
            list = list.push(permission_row(permission));
        }
    }

    column![search, scrollable(list).height(Length::Fill)]
        .spacing(8)
        .into()
}

fn permission_row<'a>(permission: &Permission) -> Element<'a, Message> {
    let description = permission
        .consent_display_name
        .clone()
        .unwrap_or_default();

    let mut badges = row![].spacing(4);
    if permission.is_admin {
        badges = badges.push(badge("Admin", style::WARNING));
    }
    badges = badges.push(if permission.consented {
        badge("Consented", style::SUCCESS)
    } else {
        badge("Not consented", style::NEUTRAL)
    });

    container(
        row![
            column![
                text(permission.value.clone()).size(12),
                text(description).size(11).style(style::muted_text),
            ]
            .spacing(2),
            horizontal_space(),
            badges,
        ]
        .spacing(6)
        .align_y(Alignment::Center),
    )
    .padding([6, 8])
    .width(Length::Fill)
    .style(|theme| style::surface_style(theme, style::Layer::Raised, 6.0))
    .into()
}

fn badge<'a>(label: &'a str, color: Color) -> Element<'a, Message> {
    container(text(label).size(10).color(color))
        .padding([2, 6])
        .style(move |_| {
            iced::widget::container::Style::default()
                .background(iced::Background::Color(Color { a: 0.12, ..color }))
                .border(iced::Border {
                    radius: 3.0.into(),
                    width: 0.0,
                    color: Color::TRANSPARENT,
                })
        })
        .into()
}

fn notice<'a>(message: &'a str) -> Element<'a, Message> {
    container(text(message).size(13).style(style::muted_text))
        .padding(16)
        .width(Length::Fill)
        .into()
}
