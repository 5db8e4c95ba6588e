pub mod body_editor;
pub mod header;
pub mod headers_editor;
pub mod permissions_panel;
pub mod request_bar;
pub mod request_editor;
pub mod response_panel;
pub mod sidebar;
pub mod status_bar;
pub mod style;
