pub mod catalog_panel;
pub mod chart_panel;
pub mod chat_panel;
pub mod details_panel;
