use iced::alignment::Alignment;
use iced::widget::{button, column, container, horizontal_rule, horizontal_space, row, scrollable, text, text_input, Column};
use iced::{Element, Length};

use crate::collections::ResourceCollection;
use crate::http::method::HttpMethod;
use crate::samples::{should_run_query, SampleQuery};
use crate::state::AppState;
use crate::{Message, SidebarView};

use super::style;

pub fn view<'a>(sidebar_view: SidebarView, state: &'a AppState) -> Element<'a, Message> {
    let nav = row![
        nav_button("Samples", SidebarView::Samples, sidebar_view),
        nav_button("Copilot", SidebarView::Copilot, sidebar_view),
        nav_button("Collection", SidebarView::Collection, sidebar_view),
        nav_button("Scopes", SidebarView::Permissions, sidebar_view),
    ]
    .spacing(0)
    .height(36);

    let body = match sidebar_view {
        SidebarView::Samples => samples_view(state),
        SidebarView::Copilot => copilot_view(state),
        SidebarView::Collection => collection_view(&state.collection),
        SidebarView::Permissions => super::permissions_panel::catalog_view(state),
    };

    container(
        column![
            container(nav).style(|theme| style::flat_surface_style(theme, style::Layer::Panel)),
            horizontal_rule(1).style(style::divider),
            container(body).padding([8, 10]).height(Length::Fill),
        ]
        .spacing(0),
    )
    .height(Length::Fill)
    .style(|theme| style::surface_style(theme, style::Layer::Panel, 0.0))
    .into()
}

fn nav_button<'a>(label: &'a str, view: SidebarView, active: SidebarView) -> iced::widget::Button<'a, Message> {
    let is_active = active == view;
    button(
        column![
            container(text(label).size(12).style(move |theme| style::tab_label(is_active, theme)))
                .padding([8, 8])
                .center_y(Length::Fill),
            container(text("").size(2))
                .height(2)
                .width(Length::Fill)
                .style(move |theme| style::tab_indicator(is_active, theme)),
        ]
        .height(Length::Fill)
    )
    .on_press(Message::SidebarViewSelected(view))
    .width(Length::Fill)
    .padding(0)
    .style(move |theme, status| style::section_tab_button(is_active, theme, status))
}

fn method_badge<'a>(method: HttpMethod) -> Element<'a, Message> {
    let color = style::method_color(method);
    let label = match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
        HttpMethod::Put => "PUT",
        HttpMethod::Patch => "PTCH",
        HttpMethod::Delete => "DEL",
    };
    container(text(label).size(10).color(color))
        .padding([2, 4])
        .width(38)
        .center_x(Length::Shrink)
        .style(move |_| iced::widget::container::Style::default()
            .background(iced::Background::Color(iced::Color {
                a: 0.12,
                ..color
            }))
            .border(iced::Border {
                radius: 3.0.into(),
                width: 0.0,
                color: iced::Color::TRANSPARENT,
            }))
        .into()
}

fn samples_view(state: &AppState) -> Element<'_, Message> {
    let search = text_input("Search sample queries", &state.samples.keyword)
        .on_input(Message::SampleSearchChanged)
        .padding([6, 8])
        .size(12)
        .style(style::input_style);

    let mut list = Column::new().spacing(4);
    if state.samples.loading {
        list = list.push(text("Loading samples...").size(12).style(style::muted_text));
    } else if state.samples.visible.is_empty() {
        list = list.push(text("No samples match your search").size(12).style(style::muted_text));
    }

    let authenticated = state.token_present();
    if state.samples.groups.is_empty() {
        for (index, sample) in state.samples.visible.iter().enumerate() {
            list = list.push(sample_button(index, sample, state.samples.selected, authenticated));
        }
    }
    for group in &state.samples.groups {
        list = list.push(
            text(format!("{} ({})", group.name, group.count))
                .size(11)
                .style(style::muted_text),
        );
        let end = group.start_index + group.count;
        for (index, sample) in state.samples.visible[group.start_index..end]
            .iter()
            .enumerate()
            .map(|(offset, sample)| (group.start_index + offset, sample))
        {
            list = list.push(sample_button(index, sample, state.samples.selected, authenticated));
        }
    }

    column![search, scrollable(list).height(Length::Fill)]
        .spacing(8)
        .into()
}

fn sample_button<'a>(
    index: usize,
    sample: &'a SampleQuery,
    selected: Option<usize>,
    authenticated: bool,
) -> Element<'a, Message> {
    let runnable = should_run_query(sample.method, authenticated);
    let is_active = selected == Some(index);

    let mut label = row![
        method_badge(sample.method),
        text(truncate(&sample.human_name, 30)).size(12),
    ]
    .spacing(6)
    .align_y(Alignment::Center);
    if !runnable {
        label = label.push(horizontal_space()).push(text("🔒").size(10));
    }

    let item = button(label)
        .width(Length::Fill)
        .padding([6, 8])
        .style(move |theme, status| style::list_item_button(is_active, theme, status));
    if runnable {
        item.on_press(Message::SampleSelected(index)).into()
    } else {
        item.into()
    }
}

fn copilot_view(state: &AppState) -> Element<'_, Message> {
    let input = text_input("Describe the request you want to make", &state.copilot.text)
        .on_input(Message::CopilotTextChanged)
        .on_submit(Message::CopilotSubmitted)
        .padding([6, 8])
        .size(12)
        .style(style::input_style);

    let ask = button(text("Ask").size(12))
        .on_press(Message::CopilotSubmitted)
        .padding([6, 12])
        .style(style::primary_button);

    let progress = if state.copilot.in_flight.is_some() {
        text("Thinking...").size(12).style(style::muted_text)
    } else {
        text("The suggested request replaces the one in the request bar.")
            .size(11)
            .style(style::muted_text)
    };

    column![
        text("Copilot").size(11).style(style::muted_text),
        row![input, ask].spacing(6).align_y(Alignment::Center),
        progress,
    ]
    .spacing(8)
    .into()
}

fn collection_view(collection: &ResourceCollection) -> Element<'_, Message> {
    let export = button(text("Export").size(11))
        .on_press_maybe((!collection.paths.is_empty()).then_some(Message::ExportPressed))
        .padding([3, 8])
        .style(style::ghost_button);

    let mut list = column![
        row![
            text(collection.name.as_str()).size(11).style(style::muted_text),
            horizontal_space(),
            export,
        ]
        .align_y(Alignment::Center)
    ]
    .spacing(6);

    if collection.paths.is_empty() {
        list = list.push(text("Add queries from the request bar").size(12).style(style::muted_text));
    }
    for (index, link) in collection.paths.iter().enumerate() {
        let item = row![
            method_badge(link.method),
            column![
                text(truncate(&link.url, 26)).size(12),
                text(link.version.as_str()).size(10).style(style::muted_text),
            ]
            .spacing(2),
            horizontal_space(),
            button(text("✕").size(11))
                .on_press(Message::CollectionPathRemoved(index))
                .padding([4, 6])
                .style(style::ghost_button),
        ]
        .spacing(6)
        .align_y(Alignment::Center);
        list = list.push(
            container(item)
                .padding([4, 8])
                .style(|theme| style::surface_style(theme, style::Layer::Raised, 6.0)),
        );
    }

    scrollable(list.spacing(4)).height(Length::Fill).into()
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let kept: String = value.chars().take(max_chars).collect();
        format!("{kept}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("/me/events", 26), "/me/events");
        assert_eq!(truncate("résumé-documents", 3), "rés…");
    }
}
