pub mod prefs;
pub mod registry;
pub mod selection;
pub mod theme;
