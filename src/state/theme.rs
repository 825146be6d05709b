use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// Accent for the primary (USD) axis labels.
    pub fn primary_axis_color(&self) -> Color32 {
        Color32::from_rgb(34, 211, 238)
    }

    /// Accent for the secondary (percent/bps/index) axis labels.
    pub fn secondary_axis_color(&self) -> Color32 {
        Color32::from_rgb(139, 92, 246)
    }

    pub fn error_color(&self) -> Color32 {
        Color32::from_rgb(255, 80, 80)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}
