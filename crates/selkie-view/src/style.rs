//! Default appearance settings.
//!
//! New views take their initial colors and font from a [`StyleDefaults`],
//! so an embedding application can plug its preference store in without
//! touching view constructors. Deserializes from the same JSON shape the
//! preference file uses.

use serde::{Deserialize, Serialize};

use crate::canvas::{Font, FontStyle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StyleDefaults {
    pub line_color: String,
    pub fill_color: String,
    pub font_color: String,
    pub font_face: String,
    pub font_size: f64,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            line_color: "#000000".to_string(),
            fill_color: "#ffffff".to_string(),
            font_color: "#000000".to_string(),
            font_face: "Arial".to_string(),
            font_size: 13.0,
        }
    }
}

impl StyleDefaults {
    /// Reads defaults from a preference JSON document. Missing fields keep
    /// their built-in values.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn font(&self) -> Font {
        Font::new(self.font_face.clone(), self.font_size, FontStyle::Normal)
    }
}
