//! Widget styles. Surfaces and text colors are derived from the active
//! [`Theme`], so every [`ThemeChoice`] restyles the panels too. Accent colors
//! (methods, message types, badges) are fixed and read on any background.

use iced::widget::{button, container, pick_list, rule, text, text_editor, text_input};
use iced::{Background, Border, Color, Theme};

use crate::http::method::HttpMethod;
use crate::state::ThemeChoice;
use crate::status::MessageType;

pub const SUCCESS: Color = Color::from_rgb(58.0 / 255.0, 201.0 / 255.0, 111.0 / 255.0);
pub const WARNING: Color = Color::from_rgb(242.0 / 255.0, 196.0 / 255.0, 15.0 / 255.0);
pub const INFO: Color = Color::from_rgb(82.0 / 255.0, 167.0 / 255.0, 244.0 / 255.0);
pub const DANGER: Color = Color::from_rgb(226.0 / 255.0, 92.0 / 255.0, 92.0 / 255.0);
pub const NEUTRAL: Color = Color::from_rgb(132.0 / 255.0, 145.0 / 255.0, 160.0 / 255.0);

/// How far a container sits above the window background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Window,
    Panel,
    Raised,
}

/// Colors resolved from a theme palette.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Tokens {
    window: Color,
    panel: Color,
    raised: Color,
    overlay: Color,
    border: Color,
    text: Color,
    muted: Color,
    primary: Color,
    primary_strong: Color,
    on_primary: Color,
}

fn mix(from: Color, to: Color, amount: f32) -> Color {
    Color {
        r: from.r + (to.r - from.r) * amount,
        g: from.g + (to.g - from.g) * amount,
        b: from.b + (to.b - from.b) * amount,
        a: 1.0,
    }
}

fn tokens(theme: &Theme) -> Tokens {
    let palette = theme.extended_palette();
    let window = palette.background.base.color;
    let text = palette.background.base.text;
    Tokens {
        window,
        panel: mix(window, text, 0.03),
        raised: mix(window, text, 0.06),
        overlay: mix(window, text, 0.11),
        border: mix(window, text, 0.18),
        text,
        muted: mix(text, window, 0.42),
        primary: palette.primary.base.color,
        primary_strong: palette.primary.strong.color,
        on_primary: palette.primary.base.text,
    }
}

fn layer_color(tokens: &Tokens, layer: Layer) -> Color {
    match layer {
        Layer::Window => tokens.window,
        Layer::Panel => tokens.panel,
        Layer::Raised => tokens.raised,
    }
}

pub fn method_color(method: HttpMethod) -> Color {
    match method {
        HttpMethod::Get => Color::from_rgb(73.0 / 255.0, 204.0 / 255.0, 144.0 / 255.0),
        HttpMethod::Post => Color::from_rgb(1.0, 176.0 / 255.0, 59.0 / 255.0),
        HttpMethod::Put => INFO,
        HttpMethod::Patch => Color::from_rgb(180.0 / 255.0, 130.0 / 255.0, 240.0 / 255.0),
        HttpMethod::Delete => DANGER,
    }
}

pub fn message_type_color(message_type: MessageType) -> Color {
    match message_type {
        MessageType::Info => INFO,
        MessageType::Success => SUCCESS,
        MessageType::Warning => WARNING,
        MessageType::Error => DANGER,
    }
}

pub fn status_code_color(code: u16) -> Option<Color> {
    match code {
        200..=299 => Some(SUCCESS),
        300..=399 => Some(WARNING),
        400..=599 => Some(DANGER),
        _ => None,
    }
}

pub fn app_theme(choice: ThemeChoice) -> Theme {
    let palette = match choice {
        ThemeChoice::Dark => iced::theme::Palette {
            background: Color::from_rgb(18.0 / 255.0, 21.0 / 255.0, 27.0 / 255.0),
            text: Color::from_rgb(230.0 / 255.0, 236.0 / 255.0, 244.0 / 255.0),
            primary: SUCCESS,
            success: SUCCESS,
            danger: DANGER,
        },
        ThemeChoice::Light => iced::theme::Palette {
            background: Color::from_rgb(0.96, 0.97, 0.98),
            text: Color::from_rgb(0.11, 0.13, 0.16),
            primary: Color::from_rgb(0.0, 0.47, 0.83),
            success: SUCCESS,
            danger: DANGER,
        },
        ThemeChoice::HighContrast => iced::theme::Palette {
            background: Color::BLACK,
            text: Color::WHITE,
            primary: Color::from_rgb(1.0, 1.0, 0.0),
            success: Color::from_rgb(0.25, 1.0, 0.25),
            danger: Color::from_rgb(1.0, 0.3, 0.3),
        },
    };
    Theme::custom(format!("Graph Explorer {choice}"), palette)
}

pub fn muted_text(theme: &Theme) -> text::Style {
    text::Style {
        color: Some(tokens(theme).muted),
    }
}

pub fn tab_label(active: bool, theme: &Theme) -> text::Style {
    let tokens = tokens(theme);
    text::Style {
        color: Some(if active { tokens.text } else { tokens.muted }),
    }
}

pub fn surface_style(theme: &Theme, layer: Layer, border_radius: f32) -> container::Style {
    let tokens = tokens(theme);
    container::Style::default()
        .background(Background::Color(layer_color(&tokens, layer)))
        .color(tokens.text)
        .border(Border {
            radius: border_radius.into(),
            width: 1.0,
            color: tokens.border,
        })
}

pub fn flat_surface_style(theme: &Theme, layer: Layer) -> container::Style {
    let tokens = tokens(theme);
    container::Style::default()
        .background(Background::Color(layer_color(&tokens, layer)))
        .color(tokens.text)
}

/// The underline under a tab; only the selected tab shows it.
pub fn tab_indicator(active: bool, theme: &Theme) -> container::Style {
    let tokens = tokens(theme);
    let color = if active { tokens.primary } else { tokens.panel };
    container::Style::default().background(Background::Color(color))
}

pub fn divider(theme: &Theme) -> rule::Style {
    rule::Style {
        color: tokens(theme).border,
        width: 1,
        radius: 0.0.into(),
        fill_mode: rule::FillMode::Full,
    }
}

pub fn section_tab_button(active: bool, theme: &Theme, status: button::Status) -> button::Style {
    let tokens = tokens(theme);
    let bg = match status {
        button::Status::Active if active => tokens.raised,
        button::Status::Active | button::Status::Disabled => tokens.panel,
        button::Status::Hovered => tokens.raised,
        button::Status::Pressed => tokens.overlay,
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color: if active { tokens.text } else { tokens.muted },
        border: Border::default(),
        shadow: Default::default(),
    }
}

pub fn primary_button(theme: &Theme, status: button::Status) -> button::Style {
    let tokens = tokens(theme);
    let (bg, text_color) = match status {
        button::Status::Active | button::Status::Pressed => (tokens.primary, tokens.on_primary),
        button::Status::Hovered => (tokens.primary_strong, tokens.on_primary),
        button::Status::Disabled => (tokens.overlay, tokens.muted),
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color,
        border: Border {
            radius: 8.0.into(),
            width: 1.0,
            color: bg,
        },
        shadow: Default::default(),
    }
}

pub fn subtle_button(theme: &Theme, status: button::Status) -> button::Style {
    let tokens = tokens(theme);
    let bg = match status {
        button::Status::Active => tokens.raised,
        button::Status::Hovered | button::Status::Pressed => tokens.overlay,
        button::Status::Disabled => tokens.panel,
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color: if matches!(status, button::Status::Disabled) { tokens.muted } else { tokens.text },
        border: Border {
            radius: 8.0.into(),
            width: 1.0,
            color: tokens.border,
        },
        shadow: Default::default(),
    }
}

pub fn ghost_button(theme: &Theme, status: button::Status) -> button::Style {
    let tokens = tokens(theme);
    let bg = match status {
        button::Status::Hovered | button::Status::Pressed => tokens.raised,
        button::Status::Active | button::Status::Disabled => tokens.panel,
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color: if matches!(status, button::Status::Disabled) { tokens.border } else { tokens.muted },
        border: Border {
            radius: 6.0.into(),
            width: 1.0,
            color: tokens.border,
        },
        shadow: Default::default(),
    }
}

/// A sample or collection row. Locked samples render disabled.
pub fn list_item_button(active: bool, theme: &Theme, status: button::Status) -> button::Style {
    let tokens = tokens(theme);
    let bg = match status {
        button::Status::Active if active => Color { a: 0.15, ..tokens.primary },
        button::Status::Active | button::Status::Disabled => tokens.panel,
        button::Status::Hovered => tokens.raised,
        button::Status::Pressed => tokens.overlay,
    };

    button::Style {
        background: Some(Background::Color(bg)),
        text_color: if active { tokens.text } else { tokens.muted },
        border: Border {
            radius: 6.0.into(),
            width: if active { 1.0 } else { 0.0 },
            color: if active { tokens.primary } else { tokens.border },
        },
        shadow: Default::default(),
    }
}

pub fn input_style(theme: &Theme, status: text_input::Status) -> text_input::Style {
    let tokens = tokens(theme);
    let base = text_input::Style {
        background: Background::Color(tokens.raised),
        border: Border {
            radius: 8.0.into(),
            width: 1.0,
            color: tokens.border,
        },
        icon: tokens.muted,
        placeholder: tokens.muted,
        value: tokens.text,
        selection: Color { a: 0.35, ..tokens.primary },
    };

    let border_color = match status {
        text_input::Status::Active | text_input::Status::Disabled => tokens.border,
        text_input::Status::Hovered => tokens.muted,
        text_input::Status::Focused => tokens.primary,
    };
    text_input::Style {
        border: Border {
            color: border_color,
            ..base.border
        },
        value: if matches!(status, text_input::Status::Disabled) { tokens.muted } else { tokens.text },
        ..base
    }
}

pub fn editor_style(theme: &Theme, status: text_editor::Status) -> text_editor::Style {
    let tokens = tokens(theme);
    let border_color = match status {
        text_editor::Status::Active | text_editor::Status::Disabled => tokens.border,
        text_editor::Status::Hovered => tokens.muted,
        text_editor::Status::Focused => tokens.primary,
    };

    text_editor::Style {
        background: Background::Color(tokens.raised),
        border: Border {
            radius: 8.0.into(),
            width: 1.0,
            color: border_color,
        },
        icon: tokens.muted,
        placeholder: tokens.muted,
        value: if matches!(status, text_editor::Status::Disabled) { tokens.muted } else { tokens.text },
        selection: Color { a: 0.35, ..tokens.primary },
    }
}

pub fn pick_list_style(theme: &Theme, status: pick_list::Status) -> pick_list::Style {
    let tokens = tokens(theme);
    pick_list::Style {
        text_color: tokens.text,
        background: Background::Color(tokens.raised),
        placeholder_color: tokens.muted,
        handle_color: tokens.muted,
        border: Border {
            radius: 8.0.into(),
            width: 1.0,
            color: match status {
                pick_list::Status::Active => tokens.border,
                pick_list::Status::Hovered | pick_list::Status::Opened => tokens.primary,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn luminance(color: Color) -> f32 {
        0.2126 * color.r + 0.7152 * color.g + 0.0722 * color.b
    }

    #[test]
    fn surfaces_follow_the_selected_theme() {
        let dark = tokens(&app_theme(ThemeChoice::Dark));
        let light = tokens(&app_theme(ThemeChoice::Light));
        assert!(luminance(dark.panel) < 0.5);
        assert!(luminance(light.panel) > 0.5);
    }

    #[test]
    fn raised_layers_move_toward_the_text_color() {
        for choice in ThemeChoice::ALL {
            let tokens = tokens(&app_theme(choice));
            let distance = |color: Color| (luminance(color) - luminance(tokens.window)).abs();
            assert!(distance(tokens.panel) < distance(tokens.raised), "{choice}");
            assert!(distance(tokens.raised) < distance(tokens.overlay), "{choice}");
            assert!(distance(tokens.overlay) < distance(tokens.border), "{choice}");
        }
    }

    #[test]
    fn unknown_status_codes_use_the_theme_text_color() {
        assert_eq!(status_code_color(204), Some(SUCCESS));
        assert_eq!(status_code_color(403), Some(DANGER));
        assert_eq!(status_code_color(101), None);
    }
}
