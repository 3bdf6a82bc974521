//! Slash-command tags and the registration request shapes they serialize to.

use std::sync::OnceLock;

use regex::Regex;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::builder::{join_text, leaf_kind, unexpected};
use crate::element::{Node, Resolved, Tag};
use crate::error::{TsxError, TsxResult};
use crate::props::Props;

const MAX_NAME_LEN: usize = 32;
const MAX_DESCRIPTION_LEN: usize = 100;
const MAX_OPTIONS: usize = 25;
const MAX_CHOICES: usize = 25;

/// Chat input command type code.
const CHAT_INPUT: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKind {
    Subcommand,
    SubcommandGroup,
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl OptionKind {
    pub fn code(self) -> u8 {
        match self {
            OptionKind::Subcommand => 1,
            OptionKind::SubcommandGroup => 2,
            OptionKind::String => 3,
            OptionKind::Integer => 4,
            OptionKind::Boolean => 5,
            OptionKind::User => 6,
            OptionKind::Channel => 7,
            OptionKind::Role => 8,
            OptionKind::Mentionable => 9,
            OptionKind::Number => 10,
            OptionKind::Attachment => 11,
        }
    }

    pub fn tag_name(self) -> &'static str {
        match self {
            OptionKind::Subcommand => "subcommand",
            OptionKind::SubcommandGroup => "subcommandgroup",
            OptionKind::String => "string",
            OptionKind::Integer => "integer",
            OptionKind::Boolean => "boolean",
            OptionKind::User => "user",
            OptionKind::Channel => "channel",
            OptionKind::Role => "role",
            OptionKind::Mentionable => "mentionable",
            OptionKind::Number => "number",
            OptionKind::Attachment => "attachment",
        }
    }

    /// Value option kinds addressable as their own tag.
    pub fn from_tag_name(name: &str) -> Option<Self> {
        Some(match name {
            "string" => OptionKind::String,
            "integer" => OptionKind::Integer,
            "boolean" => OptionKind::Boolean,
            "user" => OptionKind::User,
            "channel" => OptionKind::Channel,
            "role" => OptionKind::Role,
            "mentionable" => OptionKind::Mentionable,
            "number" => OptionKind::Number,
            "attachment" => OptionKind::Attachment,
            _ => return None,
        })
    }

    pub fn is_subcommand(self) -> bool {
        matches!(self, OptionKind::Subcommand | OptionKind::SubcommandGroup)
    }

    fn accepts_choices(self) -> bool {
        matches!(
            self,
            OptionKind::String | OptionKind::Integer | OptionKind::Number
        )
    }
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandChoice {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOption {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<CommandChoice>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<CommandOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autocomplete: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_types: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationCommand {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_member_permissions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dm_permission: Option<bool>,
}

// ─── Props ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommandProps {
    name: String,
    description: Option<String>,
    default_member_permissions: Option<String>,
    dm_permission: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionProps {
    name: String,
    description: Option<String>,
    #[serde(default)]
    required: bool,
    min_value: Option<f64>,
    max_value: Option<f64>,
    min_length: Option<u16>,
    max_length: Option<u16>,
    #[serde(default)]
    autocomplete: bool,
    #[serde(default)]
    channel_types: Vec<u8>,
}

// ─── Builders ────────────────────────────────────────────────────────────────

pub(crate) fn build_command(props: &Props, leaves: Vec<Node>) -> TsxResult<ApplicationCommand> {
    let p: CommandProps = props.decode(Tag::Command)?;
    let (options, text) = split_children(Tag::Command, leaves, |_| true)?;
    let command = ApplicationCommand {
        description: p.description.unwrap_or(text),
        name: p.name,
        options,
        kind: CHAT_INPUT,
        default_member_permissions: p.default_member_permissions,
        dm_permission: p.dm_permission,
    };
    validate_name(&command.name)?;
    validate_description(&command.name, &command.description)?;
    validate_options(&command.name, &command.options)?;
    Ok(command)
}

pub(crate) fn build_subcommand(props: &Props, leaves: Vec<Node>) -> TsxResult<CommandOption> {
    let (options, text) = split_children(Tag::Subcommand, leaves, |o| !o.kind.is_subcommand())?;
    let option = option_from_props(OptionKind::Subcommand, Tag::Subcommand, props, text, options)?;
    Ok(option)
}

pub(crate) fn build_subcommand_group(props: &Props, leaves: Vec<Node>) -> TsxResult<CommandOption> {
    let (options, text) = split_children(Tag::SubcommandGroup, leaves, |o| {
        o.kind == OptionKind::Subcommand
    })?;
    option_from_props(
        OptionKind::SubcommandGroup,
        Tag::SubcommandGroup,
        props,
        text,
        options,
    )
}

pub(crate) fn build_value_option(
    kind: OptionKind,
    props: &Props,
    leaves: Vec<Node>,
) -> TsxResult<CommandOption> {
    let tag = Tag::CommandOption(kind);
    let mut choices = Vec::new();
    let mut text = String::new();
    for leaf in leaves {
        match leaf {
            Node::Element(Resolved::Choice(choice)) if kind.accepts_choices() => choices.push(choice),
            Node::Text(fragment) => text.push_str(&fragment),
            other => return Err(unexpected(tag, leaf_kind(&other))),
        }
    }
    let mut option = option_from_props(kind, tag, props, text, Vec::new())?;
    if choices.len() > MAX_CHOICES {
        return Err(TsxError::invalid_command(
            &option.name,
            format!("at most {} choices are allowed", MAX_CHOICES),
        ));
    }
    option.choices = choices;
    Ok(option)
}

pub(crate) fn build_choice(props: &Props) -> TsxResult<CommandChoice> {
    let choice: CommandChoice = props.decode(Tag::Choice)?;
    if !(choice.value.is_string() || choice.value.is_number()) {
        return Err(TsxError::invalid_props(
            Tag::Choice.as_str(),
            "value must be a string or a number",
        ));
    }
    Ok(choice)
}

fn option_from_props(
    kind: OptionKind,
    tag: Tag,
    props: &Props,
    text: String,
    options: Vec<CommandOption>,
) -> TsxResult<CommandOption> {
    let p: OptionProps = props.decode(tag)?;
    let option = CommandOption {
        kind,
        description: p.description.unwrap_or(text),
        name: p.name,
        required: p.required && !kind.is_subcommand(),
        choices: Vec::new(),
        options,
        min_value: p.min_value,
        max_value: p.max_value,
        min_length: p.min_length,
        max_length: p.max_length,
        autocomplete: p.autocomplete,
        channel_types: p.channel_types,
    };
    validate_name(&option.name)?;
    validate_description(&option.name, &option.description)?;
    validate_options(&option.name, &option.options)?;
    Ok(option)
}

/// Separate option children from description text; `allowed` filters which
/// option kinds the parent may hold.
fn split_children(
    parent: Tag,
    leaves: Vec<Node>,
    allowed: impl Fn(&CommandOption) -> bool,
) -> TsxResult<(Vec<CommandOption>, String)> {
    let mut options = Vec::new();
    let mut text = Vec::new();
    for leaf in leaves {
        match leaf {
            Node::Element(Resolved::CommandOption(option)) => {
                if !allowed(&option) {
                    return Err(unexpected(parent, option.kind.tag_name()));
                }
                options.push(option);
            }
            other => text.push(other),
        }
    }
    Ok((options, join_text(parent, text)?))
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[-_\p{L}\p{N}]{1,32}$").expect("static pattern"))
}

pub fn validate_name(name: &str) -> TsxResult<()> {
    if !name_pattern().is_match(name) {
        return Err(TsxError::invalid_command(
            name,
            format!(
                "names must be 1-{} letters, digits, '-' or '_'",
                MAX_NAME_LEN
            ),
        ));
    }
    if name.to_lowercase() != name {
        return Err(TsxError::invalid_command(name, "names must be lowercase"));
    }
    Ok(())
}

fn validate_description(name: &str, description: &str) -> TsxResult<()> {
    let len = description.chars().count();
    if len == 0 || len > MAX_DESCRIPTION_LEN {
        return Err(TsxError::invalid_command(
            name,
            format!("description must be 1-{} characters", MAX_DESCRIPTION_LEN),
        ));
    }
    Ok(())
}

fn validate_options(name: &str, options: &[CommandOption]) -> TsxResult<()> {
    if options.len() > MAX_OPTIONS {
        return Err(TsxError::invalid_command(
            name,
            format!("at most {} options are allowed", MAX_OPTIONS),
        ));
    }
    let subcommands = options.iter().filter(|o| o.kind.is_subcommand()).count();
    if subcommands > 0 && subcommands < options.len() {
        return Err(TsxError::invalid_command(
            name,
            "subcommands cannot be mixed with value options",
        ));
    }
    if let Some(pos) = options.iter().position(|o| !o.required) {
        if options[pos..].iter().any(|o| o.required) {
            return Err(TsxError::invalid_command(
                name,
                "required options must come before optional ones",
            ));
        }
    }
    let mut seen = std::collections::HashSet::new();
    for option in options {
        if !seen.insert(option.name.as_str()) {
            return Err(TsxError::invalid_command(
                name,
                format!("duplicate option name '{}'", option.name),
            ));
        }
    }
    Ok(())
}

// ─── Registration requests ───────────────────────────────────────────────────

/// Where a command is registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandScope {
    Global,
    Guild(String),
}

/// Create, update or delete one registered command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandRequest {
    Create {
        application_id: String,
        scope: CommandScope,
        command: ApplicationCommand,
    },
    Update {
        application_id: String,
        scope: CommandScope,
        command_id: String,
        command: ApplicationCommand,
    },
    Delete {
        application_id: String,
        scope: CommandScope,
        command_id: String,
    },
}

impl CommandRequest {
    pub fn method(&self) -> &'static str {
        match self {
            CommandRequest::Create { .. } => "POST",
            CommandRequest::Update { .. } => "PATCH",
            CommandRequest::Delete { .. } => "DELETE",
        }
    }

    pub fn path(&self) -> String {
        let (application_id, scope, command_id) = match self {
            CommandRequest::Create {
                application_id,
                scope,
                ..
            } => (application_id, scope, None),
            CommandRequest::Update {
                application_id,
                scope,
                command_id,
                ..
            }
            | CommandRequest::Delete {
                application_id,
                scope,
                command_id,
            } => (application_id, scope, Some(command_id)),
        };
        let base = match scope {
            CommandScope::Global => format!("/applications/{}/commands", application_id),
            CommandScope::Guild(guild) => {
                format!("/applications/{}/guilds/{}/commands", application_id, guild)
            }
        };
        match command_id {
            Some(id) => format!("{}/{}", base, id),
            None => base,
        }
    }

    pub fn body(&self) -> Option<Value> {
        match self {
            CommandRequest::Create { command, .. } | CommandRequest::Update { command, .. } => {
                Some(json!(command))
            }
            CommandRequest::Delete { .. } => None,
        }
    }
}
