//! String-keyed command protocol.
//!
//! A toolbar (local, detached, or a script) names an operation and passes
//! an opaque JSON value. Parsing turns that pair into a typed `Command`;
//! the editor applies it to the current selection.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use gridtable_engine::{
    Alignment, BorderSides, BorderSpec, ColorType, ContentType, FontStyle, Position,
    VerticalAlignment,
};

/// Table-level boolean flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFlag {
    ShowBorders,
    StripedRows,
    HoverEffect,
    Responsive,
}

impl TableFlag {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "showBorders" => Some(Self::ShowBorders),
            "stripedRows" => Some(Self::StripedRows),
            "hoverEffect" => Some(Self::HoverEffect),
            "responsive" => Some(Self::Responsive),
            _ => None,
        }
    }
}

/// Payload of `insertLink`. Offsets are chars into the editing cell's
/// plain text; without them the whole text is linked. With `text` and an
/// empty range the text is inserted as a new link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkRequest {
    pub href: String,
    pub target: Option<String>,
    pub text: Option<String>,
    pub start: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextSpan {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddRow(Position),
    /// Explicit row, or the first selected cell's row.
    RemoveRow(Option<usize>),
    AddColumn(Position),
    RemoveColumn(Option<usize>),
    SetColumnWidth { index: Option<usize>, width: String },
    SetRowHeight { index: Option<usize>, height: Option<String> },
    MergeCells,
    SplitCell,
    GrowCell,
    ShrinkCell,
    SetCellType(ContentType),
    Bold,
    Italic,
    Underline,
    Align(Alignment),
    VerticalAlign(VerticalAlignment),
    FontStyle(FontStyle),
    /// `None` border means the configured default line.
    SetBorders { sides: BorderSides, border: Option<BorderSpec> },
    SetColor { color_type: ColorType, value: Option<String> },
    SetCssClass(String),
    ToggleGrid,
    OpenImport,
    Copy,
    Cut,
    Paste,
    ClearCells,
    Undo,
    Redo,
    /// Destructive repair; `confirmed` is the user's answer to the prompt.
    FixStructure { confirmed: bool },
    SetImage { url: String, alt: String },
    /// `None` asks the link dialog collaborator for a payload.
    InsertLink(Option<LinkRequest>),
    RemoveLink(TextSpan),
    SetCaption(String),
    SetTableFlag { flag: TableFlag, value: bool },
    EditCell,
    ExitEdit,
    ClearSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Not in the vocabulary. Ignored so newer toolbars keep working.
    Unknown(String),
    InvalidValue { command: String, message: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "Unknown command '{name}'"),
            Self::InvalidValue { command, message } => write!(f, "Invalid value for {command}: {message}"),
        }
    }
}

impl std::error::Error for CommandError {}

impl Command {
    pub fn parse(name: &str, value: &Value) -> Result<Command, CommandError> {
        let invalid = |message: String| CommandError::InvalidValue { command: name.to_string(), message };

        let cmd = match name {
            "addRow" => Command::AddRow(position(value).map_err(invalid)?),
            "removeRow" => Command::RemoveRow(index(value).map_err(invalid)?),
            "addColumn" => Command::AddColumn(position(value).map_err(invalid)?),
            "removeColumn" => Command::RemoveColumn(index(value).map_err(invalid)?),
            "setColumnWidth" => Command::SetColumnWidth {
                index: index(value.get("index").unwrap_or(&Value::Null)).map_err(invalid)?,
                width: string_field(value, &["width", "value"])
                    .ok_or_else(|| invalid("expected a width".into()))?,
            },
            "setRowHeight" => Command::SetRowHeight {
                index: index(value.get("index").unwrap_or(&Value::Null)).map_err(invalid)?,
                height: string_field(value, &["height", "value"]).filter(|h| !h.is_empty()),
            },
            "mergeCells" => Command::MergeCells,
            "splitCell" => Command::SplitCell,
            "growCell" => Command::GrowCell,
            "shrinkCell" => Command::ShrinkCell,
            "setCellType" => Command::SetCellType(
                enum_value(value, ContentType::parse).ok_or_else(|| invalid("expected text or image".into()))?,
            ),
            "bold" => Command::Bold,
            "italic" => Command::Italic,
            "underline" => Command::Underline,
            "alignLeft" => Command::Align(Alignment::Left),
            "alignCenter" => Command::Align(Alignment::Center),
            "alignRight" => Command::Align(Alignment::Right),
            "alignTop" => Command::VerticalAlign(VerticalAlignment::Top),
            "alignMiddle" => Command::VerticalAlign(VerticalAlignment::Middle),
            "alignBottom" => Command::VerticalAlign(VerticalAlignment::Bottom),
            "fontStyle" => Command::FontStyle(
                enum_value(value, FontStyle::parse)
                    .ok_or_else(|| invalid("expected normal, quote or caption".into()))?,
            ),
            "setBorders" => {
                let sides: BorderSides =
                    serde_json::from_value(value.clone()).map_err(|e| invalid(e.to_string()))?;
                let border = value.get("border").and_then(BorderSpec::from_json);
                Command::SetBorders { sides, border }
            }
            "setColor" => {
                let color_type = value
                    .get("type")
                    .or_else(|| value.get("colorType"))
                    .and_then(Value::as_str)
                    .and_then(ColorType::parse)
                    .ok_or_else(|| invalid("expected a color type".into()))?;
                Command::SetColor { color_type, value: string_field(value, &["value", "color"]) }
            }
            "setCssClass" => Command::SetCssClass(value.as_str().unwrap_or("").trim().to_string()),
            "toggleGrid" => Command::ToggleGrid,
            "openImport" => Command::OpenImport,
            "copy" => Command::Copy,
            "cut" => Command::Cut,
            "paste" => Command::Paste,
            "clearCells" => Command::ClearCells,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "fixStructure" => Command::FixStructure {
                confirmed: value.as_bool().or_else(|| value.get("confirmed").and_then(Value::as_bool)).unwrap_or(false),
            },
            "setImage" => Command::SetImage {
                url: string_field(value, &["url"]).ok_or_else(|| invalid("expected an image url".into()))?,
                alt: string_field(value, &["alt"]).unwrap_or_default(),
            },
            "insertLink" => Command::InsertLink(match value {
                Value::Null => None,
                Value::String(href) => Some(LinkRequest { href: href.clone(), ..LinkRequest::default() }),
                other => Some(serde_json::from_value(other.clone()).map_err(|e| invalid(e.to_string()))?),
            }),
            "removeLink" => Command::RemoveLink(match value {
                Value::Null => TextSpan::default(),
                other => serde_json::from_value(other.clone()).map_err(|e| invalid(e.to_string()))?,
            }),
            "setCaption" => Command::SetCaption(value.as_str().unwrap_or("").to_string()),
            "setTableFlag" => {
                let flag = value
                    .get("flag")
                    .and_then(Value::as_str)
                    .and_then(TableFlag::parse)
                    .ok_or_else(|| invalid("expected a table flag".into()))?;
                let on = value
                    .get("value")
                    .and_then(Value::as_bool)
                    .ok_or_else(|| invalid("expected true or false".into()))?;
                Command::SetTableFlag { flag, value: on }
            }
            "editCell" => Command::EditCell,
            "exitEdit" => Command::ExitEdit,
            "clearSelection" => Command::ClearSelection,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(cmd)
    }

    /// Whether the command can change the document.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            Command::Copy
                | Command::OpenImport
                | Command::EditCell
                | Command::ExitEdit
                | Command::ClearSelection
                | Command::InsertLink(None)
        )
    }
}

fn position(value: &Value) -> Result<Position, String> {
    match value {
        Value::Null => Ok(Position::End),
        Value::String(s) => match s.as_str() {
            "start" => Ok(Position::Start),
            "end" => Ok(Position::End),
            other => other
                .parse::<usize>()
                .map(Position::Index)
                .map_err(|_| format!("expected start, end or an index, got '{other}'")),
        },
        Value::Number(n) => n
            .as_u64()
            .map(|n| Position::Index(n as usize))
            .ok_or_else(|| format!("expected a row/column index, got {n}")),
        Value::Object(obj) => position(obj.get("position").unwrap_or(&Value::Null)),
        other => Err(format!("expected a position, got {other}")),
    }
}

fn index(value: &Value) -> Result<Option<usize>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| format!("expected an index, got {n}")),
        Value::Object(obj) => index(obj.get("index").unwrap_or(&Value::Null)),
        other => Err(format!("expected an index, got {other}")),
    }
}

fn enum_value<T>(value: &Value, parse: fn(&str) -> Option<T>) -> Option<T> {
    value.as_str().and_then(parse)
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    if let Value::String(s) = value {
        return Some(s.clone());
    }
    keys.iter()
        .find_map(|key| value.get(*key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positions() {
        assert_eq!(Command::parse("addRow", &Value::Null), Ok(Command::AddRow(Position::End)));
        assert_eq!(Command::parse("addRow", &json!("start")), Ok(Command::AddRow(Position::Start)));
        assert_eq!(Command::parse("addColumn", &json!(2)), Ok(Command::AddColumn(Position::Index(2))));
        assert!(matches!(
            Command::parse("addRow", &json!("middle")),
            Err(CommandError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            Command::parse("rotateTable", &Value::Null),
            Err(CommandError::Unknown("rotateTable".into()))
        );
    }

    #[test]
    fn test_set_borders_payload() {
        let cmd = Command::parse(
            "setBorders",
            &json!({"right": true, "left": null, "border": {"width": "2px", "style": "double", "color": "#f00"}}),
        )
        .unwrap();
        let Command::SetBorders { sides, border } = cmd else { panic!("wrong command") };
        assert_eq!(sides.right, Some(true));
        assert_eq!(sides.left, None);
        let border = border.unwrap();
        assert_eq!(border.width, "2px");
        assert_eq!(border.color, "#f00");
    }

    #[test]
    fn test_set_color_and_flags() {
        assert_eq!(
            Command::parse("setColor", &json!({"type": "hoverBackground", "value": "#eee"})),
            Ok(Command::SetColor { color_type: ColorType::HoverBackground, value: Some("#eee".into()) })
        );
        assert_eq!(
            Command::parse("setTableFlag", &json!({"flag": "stripedRows", "value": true})),
            Ok(Command::SetTableFlag { flag: TableFlag::StripedRows, value: true })
        );
        assert_eq!(
            Command::parse("fontStyle", &json!("quote")),
            Ok(Command::FontStyle(FontStyle::Quote))
        );
    }

    #[test]
    fn test_link_payloads() {
        assert_eq!(Command::parse("insertLink", &Value::Null), Ok(Command::InsertLink(None)));
        let Ok(Command::InsertLink(Some(req))) =
            Command::parse("insertLink", &json!({"href": "/a", "start": 0, "end": 3}))
        else {
            panic!("wrong command")
        };
        assert_eq!(req.href, "/a");
        assert_eq!((req.start, req.end), (Some(0), Some(3)));
        assert!(!Command::InsertLink(None).is_mutation());
        assert!(Command::Paste.is_mutation());
    }
}
