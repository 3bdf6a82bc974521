//! Chat-platform object model.
//!
//! These are the payload types the builder produces and the transport consumes.
//! They serialize to the platform's wire shape (snake_case keys, numeric
//! `type`/`style` codes) and expose chainable setters.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TsxError, TsxResult};

// ─── Component type codes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    ActionRow,
    Button,
    StringSelect,
    TextInput,
    UserSelect,
    RoleSelect,
    MentionableSelect,
    ChannelSelect,
}

impl ComponentType {
    pub fn code(self) -> u8 {
        match self {
            ComponentType::ActionRow => 1,
            ComponentType::Button => 2,
            ComponentType::StringSelect => 3,
            ComponentType::TextInput => 4,
            ComponentType::UserSelect => 5,
            ComponentType::RoleSelect => 6,
            ComponentType::MentionableSelect => 7,
            ComponentType::ChannelSelect => 8,
        }
    }
}

impl Serialize for ComponentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

// ─── Colors ──────────────────────────────────────────────────────────────────

const NAMED_COLORS: &[(&str, u32)] = &[
    ("default", 0x000000),
    ("white", 0xffffff),
    ("aqua", 0x1abc9c),
    ("green", 0x57f287),
    ("blue", 0x3498db),
    ("yellow", 0xfee75c),
    ("purple", 0x9b59b6),
    ("luminousvividpink", 0xe91e63),
    ("fuchsia", 0xeb459e),
    ("gold", 0xf1c40f),
    ("orange", 0xe67e22),
    ("red", 0xed4245),
    ("grey", 0x95a5a6),
    ("navy", 0x34495e),
    ("darkaqua", 0x11806a),
    ("darkgreen", 0x1f8b4c),
    ("darkblue", 0x206694),
    ("darkpurple", 0x71368a),
    ("darkvividpink", 0xad1457),
    ("darkgold", 0xc27c0e),
    ("darkorange", 0xa84300),
    ("darkred", 0x992d22),
    ("darkgrey", 0x979c9f),
    ("darkergrey", 0x7f8c8d),
    ("lightgrey", 0xbcc0c0),
    ("darknavy", 0x2c3e50),
    ("blurple", 0x5865f2),
    ("greyple", 0x99aab5),
    ("darkbutnotblack", 0x2c2f33),
    ("notquiteblack", 0x23272a),
];

/// Resolve a color prop: an integer, `#rrggbb`, or a named color.
///
/// Names are matched case-insensitively with `_` ignored, so `"ORANGE"`,
/// `"Orange"` and `"DARK_RED"` all resolve.
pub fn resolve_color(value: &Value) -> TsxResult<Option<u32>> {
    let invalid = || TsxError::InvalidColor {
        value: value.to_string(),
    };
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            let n = n.as_u64().ok_or_else(invalid)?;
            if n > 0xffffff {
                return Err(invalid());
            }
            Ok(Some(n as u32))
        }
        Value::String(s) => {
            if let Some(hex) = s.strip_prefix('#') {
                if hex.len() != 6 {
                    return Err(invalid());
                }
                return u32::from_str_radix(hex, 16).map(Some).map_err(|_| invalid());
            }
            let key: String = s
                .chars()
                .filter(|c| *c != '_')
                .flat_map(char::to_lowercase)
                .collect();
            NAMED_COLORS
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, rgb)| Some(*rgb))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

// ─── Emoji ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emoji {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub animated: bool,
}

impl Emoji {
    pub fn unicode(name: impl Into<String>) -> Self {
        Emoji {
            id: None,
            name: name.into(),
            animated: false,
        }
    }

    /// Parse `<:name:id>`, `<a:name:id>`, or a bare unicode emoji.
    pub fn parse(s: &str) -> Self {
        let custom = s
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .and_then(|inner| {
                let mut parts = inner.split(':');
                let flag = parts.next()?;
                let name = parts.next()?;
                let id = parts.next()?;
                if parts.next().is_some() || !(flag.is_empty() || flag == "a") {
                    return None;
                }
                Some(Emoji {
                    id: Some(id.to_string()),
                    name: name.to_string(),
                    animated: flag == "a",
                })
            });
        custom.unwrap_or_else(|| Emoji::unicode(s))
    }

    /// The form used when an emoji is embedded in text.
    pub fn mention(&self) -> String {
        match &self.id {
            Some(id) if self.animated => format!("<a:{}:{}>", self.name, id),
            Some(id) => format!("<:{}:{}>", self.name, id),
            None => self.name.clone(),
        }
    }
}

impl<'de> Deserialize<'de> for Emoji {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Object {
                id: Option<String>,
                name: String,
                #[serde(default)]
                animated: bool,
            },
        }
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) if s.is_empty() => Err(de::Error::custom("emoji must not be empty")),
            Repr::Text(s) => Ok(Emoji::parse(&s)),
            Repr::Object { id, name, animated } => Ok(Emoji { id, name, animated }),
        }
    }
}

// ─── Embeds ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none", alias = "iconURL", alias = "iconUrl")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "iconURL", alias = "iconUrl")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

impl Embed {
    pub fn set_color(&mut self, color: Option<u32>) -> &mut Self {
        self.color = color;
        self
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into());
        self
    }

    pub fn set_footer(&mut self, footer: EmbedFooter) -> &mut Self {
        self.footer = Some(footer);
        self
    }

    pub fn add_field(&mut self, field: EmbedField) -> &mut Self {
        self.fields.push(field);
        self
    }
}

// ─── Buttons ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Success,
    Danger,
    Link,
}

impl ButtonStyle {
    pub fn code(self) -> u8 {
        match self {
            ButtonStyle::Primary => 1,
            ButtonStyle::Secondary => 2,
            ButtonStyle::Success => 3,
            ButtonStyle::Danger => 4,
            ButtonStyle::Link => 5,
        }
    }

    fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            1 => ButtonStyle::Primary,
            2 => ButtonStyle::Secondary,
            3 => ButtonStyle::Success,
            4 => ButtonStyle::Danger,
            5 => ButtonStyle::Link,
            _ => return None,
        })
    }

    fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "primary" => ButtonStyle::Primary,
            "secondary" => ButtonStyle::Secondary,
            "success" => ButtonStyle::Success,
            "danger" => ButtonStyle::Danger,
            "link" => ButtonStyle::Link,
            _ => return None,
        })
    }
}

impl Serialize for ButtonStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for ButtonStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let style = match &value {
            Value::Number(n) => n.as_u64().and_then(ButtonStyle::from_code),
            Value::String(s) => ButtonStyle::from_name(s),
            _ => None,
        };
        style.ok_or_else(|| {
            de::Error::custom(format!(
                "invalid button style {}, expected one of: primary, secondary, success, danger, link",
                value
            ))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub style: ButtonStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

impl Button {
    pub fn new(style: ButtonStyle) -> Self {
        Button {
            kind: ComponentType::Button,
            style,
            label: None,
            custom_id: None,
            url: None,
            emoji: None,
            disabled: false,
        }
    }

    pub fn set_style(&mut self, style: ButtonStyle) -> &mut Self {
        self.style = style;
        self
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = Some(url.into());
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    pub fn set_custom_id(&mut self, custom_id: impl Into<String>) -> &mut Self {
        self.custom_id = Some(custom_id.into());
        self
    }

    pub fn set_emoji(&mut self, emoji: Emoji) -> &mut Self {
        self.emoji = Some(emoji);
        self
    }

    pub fn set_disabled(&mut self, disabled: bool) -> &mut Self {
        self.disabled = disabled;
        self
    }
}

// ─── Select menus ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectKind {
    #[default]
    String,
    User,
    Role,
    Mentionable,
    Channel,
}

impl SelectKind {
    pub fn component_type(self) -> ComponentType {
        match self {
            SelectKind::String => ComponentType::StringSelect,
            SelectKind::User => ComponentType::UserSelect,
            SelectKind::Role => ComponentType::RoleSelect,
            SelectKind::Mentionable => ComponentType::MentionableSelect,
            SelectKind::Channel => ComponentType::ChannelSelect,
        }
    }
}

impl Serialize for SelectKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.component_type().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOption {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<Emoji>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectMenu {
    #[serde(rename = "type")]
    pub kind: SelectKind,
    pub custom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_values: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_values: Option<u8>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
}

impl SelectMenu {
    pub fn new(kind: SelectKind, custom_id: impl Into<String>) -> Self {
        SelectMenu {
            kind,
            custom_id: custom_id.into(),
            placeholder: None,
            min_values: None,
            max_values: None,
            disabled: false,
            options: Vec::new(),
            channel_types: Vec::new(),
        }
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) -> &mut Self {
        self.options = options;
        self
    }

    pub fn set_placeholder(&mut self, placeholder: impl Into<String>) -> &mut Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

// ─── Text inputs & modals ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextInputStyle {
    #[default]
    Short,
    Paragraph,
}

impl Serialize for TextInputStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            TextInputStyle::Short => 1,
            TextInputStyle::Paragraph => 2,
        })
    }
}

impl<'de> Deserialize<'de> for TextInputStyle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        match &value {
            Value::Number(n) if n.as_u64() == Some(1) => Ok(TextInputStyle::Short),
            Value::Number(n) if n.as_u64() == Some(2) => Ok(TextInputStyle::Paragraph),
            Value::String(s) if s.eq_ignore_ascii_case("short") => Ok(TextInputStyle::Short),
            Value::String(s) if s.eq_ignore_ascii_case("paragraph") => {
                Ok(TextInputStyle::Paragraph)
            }
            _ => Err(de::Error::custom(format!(
                "invalid text input style {}, expected short or paragraph",
                value
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextInput {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub custom_id: String,
    pub label: String,
    pub style: TextInputStyle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl TextInput {
    pub fn new(custom_id: impl Into<String>, label: impl Into<String>) -> Self {
        TextInput {
            kind: ComponentType::TextInput,
            custom_id: custom_id.into(),
            label: label.into(),
            style: TextInputStyle::Short,
            placeholder: None,
            value: None,
            min_length: None,
            max_length: None,
            required: None,
        }
    }

    pub fn set_style(&mut self, style: TextInputStyle) -> &mut Self {
        self.style = style;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Modal {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

// ─── Action rows ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RowComponent {
    Button(Button),
    Select(SelectMenu),
    TextInput(TextInput),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    kind: ComponentType,
    pub components: Vec<RowComponent>,
}

impl ActionRow {
    pub fn new(components: Vec<RowComponent>) -> Self {
        ActionRow {
            kind: ComponentType::ActionRow,
            components,
        }
    }
}

// ─── Messages ────────────────────────────────────────────────────────────────

/// Ephemeral message flag bit.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ActionRow>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub tts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessagePayload {
    pub fn content(content: impl Into<String>) -> Self {
        MessagePayload {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn set_ephemeral(&mut self, ephemeral: bool) -> &mut Self {
        let flags = self.flags.unwrap_or(0);
        let flags = if ephemeral {
            flags | EPHEMERAL_FLAG
        } else {
            flags & !EPHEMERAL_FLAG
        };
        self.flags = (flags != 0).then_some(flags);
        self
    }

    pub fn is_ephemeral(&self) -> bool {
        self.flags.is_some_and(|f| f & EPHEMERAL_FLAG != 0)
    }

    pub fn push_content(&mut self, fragment: &str) {
        self.content.get_or_insert_with(String::new).push_str(fragment);
    }
}
