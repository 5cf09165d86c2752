use serde::{Deserialize, Serialize};

/// What a cell displays.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Image,
}

/// Typographic role of a cell's text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Quote,
    Caption,
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text alignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlignment {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Stroke style of a border line.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Double,
}

impl ContentType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "image" => Some(Self::Image),
            _ => None,
        }
    }
}

impl FontStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "quote" => Some(Self::Quote),
            "caption" => Some(Self::Caption),
            _ => None,
        }
    }
}

impl Alignment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

impl VerticalAlignment {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Some(Self::Top),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// One side of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The side of a neighbouring cell that shares this edge.
    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}

/// A single border line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BorderSpec {
    /// CSS length, e.g. "1px"
    pub width: String,
    pub style: LineStyle,
    /// CSS color, e.g. "#000000"
    pub color: String,
}

impl Default for BorderSpec {
    fn default() -> Self {
        Self {
            width: "1px".to_string(),
            style: LineStyle::Solid,
            color: "#000000".to_string(),
        }
    }
}

impl BorderSpec {
    pub fn new(width: impl Into<String>, style: LineStyle, color: impl Into<String>) -> Self {
        Self { width: width.into(), style, color: color.into() }
    }

    /// Normalize a border from config. Accepts the current
    /// `{width, style, color}` shape and the legacy `{style: plain|thick|double, color}`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let color = obj
            .get("color")
            .and_then(|c| c.as_str())
            .unwrap_or("#000000")
            .to_string();
        let style = obj.get("style").and_then(|s| s.as_str()).unwrap_or("solid");
        let width = obj.get("width").and_then(|w| w.as_str());

        let (default_width, style) = match style.to_ascii_lowercase().as_str() {
            "plain" => ("1px", LineStyle::Solid),
            "thick" => ("3px", LineStyle::Solid),
            "double" => ("1px", LineStyle::Double),
            _ => ("1px", LineStyle::Solid),
        };
        let width = width.unwrap_or(default_width).to_string();
        Some(Self { width, style, color })
    }
}

/// Per-side borders. A `None` side has no border.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CellBorders {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<BorderSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<BorderSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<BorderSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<BorderSpec>,
}

impl CellBorders {
    pub fn get(&self, side: Side) -> Option<&BorderSpec> {
        match side {
            Side::Top => self.top.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
        }
    }

    pub fn set(&mut self, side: Side, spec: Option<BorderSpec>) {
        match side {
            Side::Top => self.top = spec,
            Side::Right => self.right = spec,
            Side::Bottom => self.bottom = spec,
            Side::Left => self.left = spec,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.right.is_none() && self.bottom.is_none() && self.left.is_none()
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut borders = Self::default();
        if let Some(obj) = value.as_object() {
            for side in Side::ALL {
                let key = match side {
                    Side::Top => "top",
                    Side::Right => "right",
                    Side::Bottom => "bottom",
                    Side::Left => "left",
                };
                if let Some(spec) = obj.get(key).and_then(BorderSpec::from_json) {
                    borders.set(side, Some(spec));
                }
            }
        }
        borders
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageData {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

/// One table cell. `content` is an HTML fragment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    pub content_type: ContentType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<ImageData>,
    pub colspan: usize,
    pub rowspan: usize,
    pub font_style: FontStyle,
    pub alignment: Alignment,
    pub vertical_alignment: VerticalAlignment,
    #[serde(default, skip_serializing_if = "CellBorders::is_empty")]
    pub borders: CellBorders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_bg_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hover_text_color: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub css_class: String,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            content_type: ContentType::Text,
            content: String::new(),
            image_data: None,
            colspan: 1,
            rowspan: 1,
            font_style: FontStyle::Normal,
            alignment: Alignment::Left,
            vertical_alignment: VerticalAlignment::Top,
            borders: CellBorders::default(),
            background_color: None,
            text_color: None,
            hover_bg_color: None,
            hover_text_color: None,
            css_class: String::new(),
        }
    }
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text cell with the given HTML content.
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Self::default() }
    }

    pub fn is_merged(&self) -> bool {
        self.colspan > 1 || self.rowspan > 1
    }

    pub fn is_image(&self) -> bool {
        self.content_type == ContentType::Image
    }

    /// No text and no image: safe to drop during repair.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty() && self.image_data.is_none()
    }

    pub fn reset_span(&mut self) {
        self.colspan = 1;
        self.rowspan = 1;
    }

    /// Drop content but keep styling (clear / cut source).
    pub fn clear_content(&mut self) {
        self.content.clear();
        self.content_type = ContentType::Text;
        self.image_data = None;
    }
}
