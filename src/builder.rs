//! Element builder: resolves one intrinsic element into its platform object.
//!
//! Children arrive already resolved (elements are built bottom-up, eagerly), so
//! building is a single dispatch on the tag followed by placing the flattened
//! children according to the parent's rules.

use serde::Deserialize;
use serde_json::Value;

use crate::command;
use crate::context;
use crate::element::{Node, Resolved, Tag};
use crate::error::{TsxError, TsxResult};
use crate::payload;
use crate::platform::*;
use crate::props::Props;
use crate::registry::{Handler, InteractionKind, Listener, ListenerRegistry};

// ─── Typed props ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageProps {
    content: Option<String>,
    #[serde(default)]
    tts: bool,
    #[serde(default)]
    ephemeral: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FooterProp {
    Text(String),
    Footer(EmbedFooter),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MediaProp {
    Url(String),
    Media(EmbedMedia),
}

impl From<MediaProp> for EmbedMedia {
    fn from(prop: MediaProp) -> Self {
        match prop {
            MediaProp::Url(url) => EmbedMedia { url },
            MediaProp::Media(media) => media,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmbedProps {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    timestamp: Option<String>,
    #[serde(default)]
    color: Value,
    footer: Option<FooterProp>,
    author: Option<EmbedAuthor>,
    thumbnail: Option<MediaProp>,
    image: Option<MediaProp>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FooterProps {
    text: Option<String>,
    #[serde(alias = "iconURL")]
    icon_url: Option<String>,
}

#[derive(Deserialize)]
struct FieldProps {
    name: String,
    value: Option<String>,
    #[serde(default)]
    inline: bool,
}

#[derive(Deserialize)]
struct EmojiProps {
    emoji: Emoji,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ButtonProps {
    custom_id: Option<String>,
    label: Option<String>,
    style: Option<ButtonStyle>,
    url: Option<String>,
    #[serde(default)]
    disabled: bool,
    emoji: Option<Emoji>,
    once: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectProps {
    custom_id: Option<String>,
    #[serde(rename = "type", default)]
    kind: SelectKind,
    placeholder: Option<String>,
    min_values: Option<u8>,
    max_values: Option<u8>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    channel_types: Vec<u8>,
    once: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionProps {
    label: Option<String>,
    value: String,
    description: Option<String>,
    emoji: Option<Emoji>,
    #[serde(default)]
    default: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModalProps {
    custom_id: String,
    title: String,
    once: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputProps {
    custom_id: String,
    label: String,
    style: Option<TextInputStyle>,
    placeholder: Option<String>,
    value: Option<String>,
    min_length: Option<u16>,
    max_length: Option<u16>,
    required: Option<bool>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Builds intrinsic elements, registering handlers into its registry.
#[derive(Clone, Default)]
pub struct ElementBuilder {
    registry: Option<ListenerRegistry>,
}

impl ElementBuilder {
    pub fn new(registry: ListenerRegistry) -> Self {
        ElementBuilder {
            registry: Some(registry),
        }
    }

    /// A builder with no registry; building an element with a handler fails.
    pub fn detached() -> Self {
        ElementBuilder { registry: None }
    }

    /// Builder bound to the registry of the current render context, if any.
    pub fn current() -> Self {
        ElementBuilder {
            registry: context::current_registry(),
        }
    }

    pub fn registry(&self) -> Option<&ListenerRegistry> {
        self.registry.as_ref()
    }

    pub fn build(&self, tag: Tag, props: Props, children: Vec<Node>) -> TsxResult<Resolved> {
        let leaves = Node::Fragment(children).flatten()?;
        match tag {
            Tag::Message => self.build_message(&props, leaves),
            Tag::Br => Ok(Resolved::Text("\n".to_string())),
            Tag::Embed => self.build_embed(&props, leaves),
            Tag::Footer => {
                let p: FooterProps = props.decode(tag)?;
                let text = match p.text {
                    Some(text) => text,
                    None => join_text(tag, leaves)?,
                };
                Ok(Resolved::Footer(EmbedFooter {
                    text,
                    icon_url: p.icon_url,
                }))
            }
            Tag::Field => {
                let p: FieldProps = props.decode(tag)?;
                let value = match p.value {
                    Some(value) => value,
                    None => join_text(tag, leaves)?,
                };
                Ok(Resolved::Field(EmbedField {
                    name: p.name,
                    value,
                    inline: p.inline,
                }))
            }
            Tag::Emoji => {
                let p: EmojiProps = props.decode(tag)?;
                Ok(Resolved::Emoji(p.emoji))
            }
            Tag::Row => self.build_row(leaves),
            Tag::Button => self.build_button(props, leaves),
            Tag::Select => self.build_select(props, leaves),
            Tag::Option => {
                let p: OptionProps = props.decode(tag)?;
                let label = match p.label {
                    Some(label) => label,
                    None => join_text(tag, leaves)?,
                };
                Ok(Resolved::Option(SelectOption {
                    label,
                    value: p.value,
                    description: p.description,
                    emoji: p.emoji,
                    default: p.default,
                }))
            }
            Tag::Modal => self.build_modal(props, leaves),
            Tag::Input => {
                let p: InputProps = props.decode(tag)?;
                let mut input = TextInput::new(p.custom_id, p.label);
                input.set_style(p.style.unwrap_or_default());
                input.placeholder = p.placeholder;
                input.value = p.value;
                input.min_length = p.min_length;
                input.max_length = p.max_length;
                input.required = p.required;
                Ok(Resolved::Input(input))
            }
            Tag::Command => command::build_command(&props, leaves).map(Resolved::Command),
            Tag::Subcommand => command::build_subcommand(&props, leaves).map(Resolved::CommandOption),
            Tag::SubcommandGroup => {
                command::build_subcommand_group(&props, leaves).map(Resolved::CommandOption)
            }
            Tag::CommandOption(kind) => {
                command::build_value_option(kind, &props, leaves).map(Resolved::CommandOption)
            }
            Tag::Choice => command::build_choice(&props).map(Resolved::Choice),
        }
    }

    fn register(
        &self,
        tag: Tag,
        key: &str,
        handler: Handler,
        kind: InteractionKind,
        once: Option<bool>,
    ) -> TsxResult<()> {
        let registry = self.registry.as_ref().ok_or_else(|| TsxError::NoActiveRegistry {
            tag: tag.to_string(),
        })?;
        registry.set(key, Listener::new(handler, kind, once));
        Ok(())
    }

    fn build_message(&self, props: &Props, leaves: Vec<Node>) -> TsxResult<Resolved> {
        let p: MessageProps = props.decode(Tag::Message)?;
        let mut message = payload::collect(leaves)?;
        if p.content.is_some() {
            message.content = p.content;
        }
        message.tts |= p.tts;
        if p.ephemeral {
            message.set_ephemeral(true);
        }
        Ok(Resolved::Message(message))
    }

    fn build_embed(&self, props: &Props, leaves: Vec<Node>) -> TsxResult<Resolved> {
        let p: EmbedProps = props.decode(Tag::Embed)?;
        let mut embed = Embed {
            title: p.title,
            url: p.url,
            timestamp: p.timestamp,
            author: p.author,
            thumbnail: p.thumbnail.map(Into::into),
            image: p.image.map(Into::into),
            footer: p.footer.map(|footer| match footer {
                FooterProp::Text(text) => EmbedFooter {
                    text,
                    icon_url: None,
                },
                FooterProp::Footer(footer) => footer,
            }),
            ..Default::default()
        };

        let mut text = String::new();
        for leaf in leaves {
            match leaf {
                Node::Text(fragment) => text.push_str(&fragment),
                Node::Element(Resolved::Field(field)) => {
                    embed.add_field(field);
                }
                Node::Element(Resolved::Footer(footer)) if embed.footer.is_none() => {
                    embed.set_footer(footer);
                }
                Node::Element(element) => match element.as_fragment() {
                    Some(fragment) => text.push_str(&fragment),
                    None => return Err(unexpected(Tag::Embed, element.kind())),
                },
                other => return Err(unexpected(Tag::Embed, leaf_kind(&other))),
            }
        }

        match p.description {
            Some(description) => {
                embed.set_description(description);
            }
            None if !text.is_empty() => {
                embed.set_description(text);
            }
            None => {}
        }
        embed.set_color(resolve_color(&p.color)?);
        Ok(Resolved::Embed(embed))
    }

    fn build_row(&self, leaves: Vec<Node>) -> TsxResult<Resolved> {
        let mut components = Vec::new();
        for leaf in leaves {
            components.push(match leaf {
                Node::Element(Resolved::Button(button)) => RowComponent::Button(button),
                Node::Element(Resolved::Select(select)) => RowComponent::Select(select),
                Node::Element(Resolved::Input(input)) => RowComponent::TextInput(input),
                other => return Err(unexpected(Tag::Row, leaf_kind(&other))),
            });
        }
        Ok(Resolved::Row(ActionRow::new(components)))
    }

    fn build_button(&self, props: Props, leaves: Vec<Node>) -> TsxResult<Resolved> {
        let p: ButtonProps = props.decode(Tag::Button)?;
        let label = match p.label {
            Some(label) => Some(label),
            None => Some(join_text(Tag::Button, leaves)?).filter(|l| !l.is_empty()),
        };
        let style = p.style.unwrap_or(if p.url.is_some() {
            ButtonStyle::Link
        } else {
            ButtonStyle::Primary
        });

        if p.url.is_some() {
            if props.on_click.is_some() {
                return Err(conflict(Tag::Button, "url", "onClick"));
            }
            if p.custom_id.is_some() {
                return Err(conflict(Tag::Button, "url", "customId"));
            }
        }

        let mut button = Button::new(style);
        if let Some(label) = label {
            button.set_label(label);
        }
        if let Some(emoji) = p.emoji {
            button.set_emoji(emoji);
        }
        button.set_disabled(p.disabled);
        if let Some(custom_id) = &p.custom_id {
            button.set_custom_id(custom_id.clone());
        }
        if let Some(url) = p.url {
            button.set_url(url);
        }

        if let Some(handler) = props.on_click {
            let key = p.custom_id.ok_or_else(|| TsxError::MissingCustomId {
                tag: Tag::Button.to_string(),
            })?;
            self.register(Tag::Button, &key, handler, InteractionKind::Button, p.once)?;
        }
        Ok(Resolved::Button(button))
    }

    fn build_select(&self, props: Props, leaves: Vec<Node>) -> TsxResult<Resolved> {
        let p: SelectProps = props.decode(Tag::Select)?;
        let mut options = Vec::new();
        for leaf in leaves {
            match leaf {
                Node::Element(Resolved::Option(option)) if p.kind == SelectKind::String => {
                    options.push(option)
                }
                other => return Err(unexpected(Tag::Select, leaf_kind(&other))),
            }
        }

        let mut select = SelectMenu::new(p.kind, p.custom_id.clone().unwrap_or_default());
        if let Some(placeholder) = p.placeholder {
            select.set_placeholder(placeholder);
        }
        select.min_values = p.min_values;
        select.max_values = p.max_values;
        select.disabled = p.disabled;
        if p.kind == SelectKind::Channel {
            select.channel_types = p.channel_types;
        }
        if p.kind == SelectKind::String {
            select.set_options(options);
        }

        if let (Some(handler), Some(key)) = (props.on_change, p.custom_id) {
            self.register(Tag::Select, &key, handler, InteractionKind::SelectMenu, p.once)?;
        }
        Ok(Resolved::Select(select))
    }

    fn build_modal(&self, props: Props, leaves: Vec<Node>) -> TsxResult<Resolved> {
        let p: ModalProps = props.decode(Tag::Modal)?;
        let mut rows = Vec::new();
        for leaf in leaves {
            match leaf {
                Node::Element(Resolved::Row(row)) => rows.push(row),
                Node::Element(Resolved::Input(input)) => {
                    rows.push(ActionRow::new(vec![RowComponent::TextInput(input)]))
                }
                other => return Err(unexpected(Tag::Modal, leaf_kind(&other))),
            }
        }
        if let Some(handler) = props.on_submit {
            self.register(Tag::Modal, &p.custom_id, handler, InteractionKind::Modal, p.once)?;
        }
        Ok(Resolved::Modal(Modal {
            custom_id: p.custom_id,
            title: p.title,
            components: rows,
        }))
    }
}

/// Build an intrinsic element using the current render context's registry.
///
/// Outside any render scope, elements without handlers still build; an element
/// with a handler fails with [`TsxError::NoActiveRegistry`].
pub fn create_element(tag: Tag, props: Props, children: Vec<Node>) -> TsxResult<Node> {
    ElementBuilder::current()
        .build(tag, props, children)
        .map(Node::Element)
}

/// Concatenate text-like leaves; anything structural is rejected.
pub(crate) fn join_text(parent: Tag, leaves: Vec<Node>) -> TsxResult<String> {
    let mut text = String::new();
    for leaf in leaves {
        match leaf {
            Node::Text(fragment) => text.push_str(&fragment),
            Node::Element(element) => match element.as_fragment() {
                Some(fragment) => text.push_str(&fragment),
                None => return Err(unexpected(parent, element.kind())),
            },
            other => return Err(unexpected(parent, leaf_kind(&other))),
        }
    }
    Ok(text)
}

pub(crate) fn leaf_kind(node: &Node) -> &'static str {
    match node {
        Node::Text(_) => "text",
        Node::Element(element) => element.kind(),
        Node::Empty => "empty",
        Node::Fragment(_) => "fragment",
        Node::Component(_) => "component",
    }
}

pub(crate) fn unexpected(parent: Tag, child: &str) -> TsxError {
    TsxError::UnexpectedChild {
        parent: parent.to_string(),
        child: child.to_string(),
    }
}

fn conflict(tag: Tag, first: &str, second: &str) -> TsxError {
    TsxError::ConflictingProps {
        tag: tag.to_string(),
        first: first.to_string(),
        second: second.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props;
    use pretty_assertions::assert_eq;

    fn builder() -> (ElementBuilder, ListenerRegistry) {
        let registry = ListenerRegistry::new();
        (ElementBuilder::new(registry.clone()), registry)
    }

    fn el(resolved: Resolved) -> Node {
        Node::Element(resolved)
    }

    #[test]
    fn test_br_is_newline() {
        let (b, _) = builder();
        assert_eq!(
            b.build(Tag::Br, Props::new(), vec![]).unwrap(),
            Resolved::Text("\n".into())
        );
    }

    #[test]
    fn test_embed_partitions_children() {
        let (b, _) = builder();
        let field = b
            .build(Tag::Field, props! { "name" => "f1", "value" => "v1" }, vec![])
            .unwrap();
        let embed = b
            .build(
                Tag::Embed,
                Props::new(),
                vec!["hello ".into(), el(field), "world".into()],
            )
            .unwrap();
        let Resolved::Embed(embed) = embed else {
            panic!("expected embed");
        };
        assert_eq!(embed.description.as_deref(), Some("hello world"));
        assert_eq!(
            embed.fields,
            vec![EmbedField {
                name: "f1".into(),
                value: "v1".into(),
                inline: false
            }]
        );
        assert_eq!(embed.color, None);
    }

    #[test]
    fn test_embed_explicit_description_wins() {
        let (b, _) = builder();
        let Resolved::Embed(embed) = b
            .build(
                Tag::Embed,
                props! { "description" => "explicit", "color" => "ORANGE", "footer" => "foot" },
                vec!["ignored".into()],
            )
            .unwrap()
        else {
            panic!("expected embed");
        };
        assert_eq!(embed.description.as_deref(), Some("explicit"));
        assert_eq!(embed.color, Some(0xe67e22));
        assert_eq!(embed.footer.unwrap().text, "foot");
    }

    #[test]
    fn test_embed_rejects_structural_children() {
        let (b, _) = builder();
        let row = b.build(Tag::Row, Props::new(), vec![]).unwrap();
        let result = b.build(Tag::Embed, Props::new(), vec![el(row)]);
        assert!(matches!(result, Err(TsxError::UnexpectedChild { .. })));
    }

    #[test]
    fn test_field_value_from_children_with_emoji() {
        let (b, _) = builder();
        let emoji = b
            .build(Tag::Emoji, props! { "emoji" => "<:smiling_imp:42>" }, vec![])
            .unwrap();
        let field = b
            .build(
                Tag::Field,
                props! { "name" => "field name" },
                vec![fragment_of(&["field ", "text "]), el(emoji)],
            )
            .unwrap();
        assert_eq!(
            field,
            Resolved::Field(EmbedField {
                name: "field name".into(),
                value: "field text <:smiling_imp:42>".into(),
                inline: false
            })
        );
    }

    fn fragment_of(parts: &[&str]) -> Node {
        Node::Fragment(parts.iter().map(|p| Node::from(*p)).collect())
    }

    #[test]
    fn test_field_requires_name() {
        let (b, _) = builder();
        let result = b.build(Tag::Field, props! { "value" => "v" }, vec![]);
        assert!(matches!(result, Err(TsxError::InvalidProps { .. })));
    }

    #[test]
    fn test_footer_text_from_children() {
        let (b, _) = builder();
        let footer = b
            .build(Tag::Footer, Props::new(), vec!["a".into(), 1.into()])
            .unwrap();
        assert_eq!(
            footer,
            Resolved::Footer(EmbedFooter {
                text: "a1".into(),
                icon_url: None
            })
        );
    }

    #[test]
    fn test_button_registers_listener() {
        let (b, registry) = builder();
        let button = b
            .build(
                Tag::Button,
                props! { "customId" => "b1" }.on_click(|_, _| async { Ok(()) }),
                vec!["Click".into()],
            )
            .unwrap();
        let Resolved::Button(button) = button else {
            panic!("expected button");
        };
        assert_eq!(button.label.as_deref(), Some("Click"));
        assert_eq!(button.style, ButtonStyle::Primary);
        let listener = registry.get("b1").unwrap();
        assert_eq!(listener.kind, InteractionKind::Button);
        assert_eq!(listener.once, None);
    }

    #[test]
    fn test_button_handler_requires_custom_id() {
        let (b, registry) = builder();
        let result = b.build(
            Tag::Button,
            Props::new().on_click(|_, _| async { Ok(()) }),
            vec!["x".into()],
        );
        assert!(matches!(result, Err(TsxError::MissingCustomId { .. })));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_button_url_conflicts() {
        let (b, _) = builder();
        let with_handler = b.build(
            Tag::Button,
            props! { "customId" => "b", "url" => "https://x" }.on_click(|_, _| async { Ok(()) }),
            vec![],
        );
        assert!(matches!(with_handler, Err(TsxError::ConflictingProps { .. })));

        let with_id = b.build(
            Tag::Button,
            props! { "customId" => "b", "url" => "https://x" },
            vec![],
        );
        assert!(matches!(with_id, Err(TsxError::ConflictingProps { .. })));
    }

    #[test]
    fn test_link_button_style() {
        let (b, _) = builder();
        let Resolved::Button(button) = b
            .build(Tag::Button, props! { "url" => "https://example.com" }, vec!["Docs".into()])
            .unwrap()
        else {
            panic!("expected button");
        };
        assert_eq!(button.style, ButtonStyle::Link);
        assert_eq!(button.url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_select_options_and_listener() {
        let (b, registry) = builder();
        let a = b
            .build(Tag::Option, props! { "value" => "a" }, vec!["Alpha".into()])
            .unwrap();
        let c = b
            .build(Tag::Option, props! { "label" => "Charlie", "value" => "c" }, vec![])
            .unwrap();
        let Resolved::Select(select) = b
            .build(
                Tag::Select,
                props! { "customId" => "s1", "once" => true }.on_change(|_, _| async { Ok(()) }),
                vec![el(a), el(c)],
            )
            .unwrap()
        else {
            panic!("expected select");
        };
        assert_eq!(select.kind, SelectKind::String);
        let labels: Vec<_> = select.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "Charlie"]);
        let listener = registry.get("s1").unwrap();
        assert_eq!(listener.kind, InteractionKind::SelectMenu);
        assert_eq!(listener.once, Some(true));
    }

    #[test]
    fn test_select_handler_without_custom_id_is_not_registered() {
        let (b, registry) = builder();
        let result = b.build(
            Tag::Select,
            props! { "type" => "role" }.on_change(|_, _| async { Ok(()) }),
            vec![],
        );
        let Resolved::Select(select) = result.unwrap() else {
            panic!("expected select");
        };
        assert_eq!(select.kind, SelectKind::Role);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_modal_wraps_inputs_in_rows() {
        let (b, registry) = builder();
        let input = b
            .build(
                Tag::Input,
                props! { "customId" => "name", "label" => "Name", "style" => "paragraph" },
                vec![],
            )
            .unwrap();
        let Resolved::Modal(modal) = b
            .build(
                Tag::Modal,
                props! { "customId" => "m1", "title" => "Form" }.on_submit(|_, _| async { Ok(()) }),
                vec![el(input)],
            )
            .unwrap()
        else {
            panic!("expected modal");
        };
        assert_eq!(modal.components.len(), 1);
        assert_eq!(
            serde_json::to_value(&modal.components[0]).unwrap()["components"][0]["type"],
            4
        );
        assert_eq!(registry.get("m1").unwrap().kind, InteractionKind::Modal);
    }

    #[test]
    fn test_detached_builder_rejects_handlers() {
        let b = ElementBuilder::detached();
        let result = b.build(
            Tag::Button,
            props! { "customId" => "b" }.on_click(|_, _| async { Ok(()) }),
            vec![],
        );
        assert!(matches!(result, Err(TsxError::NoActiveRegistry { .. })));
        assert!(b.build(Tag::Button, props! { "customId" => "b" }, vec![]).is_ok());
    }

    #[test]
    fn test_build_is_idempotent() {
        let (b, _) = builder();
        let make = || {
            let field = b
                .build(Tag::Field, props! { "name" => "n", "inline" => true }, vec!["v".into()])
                .unwrap();
            b.build(
                Tag::Embed,
                props! { "title" => "t", "color" => 0x123456 },
                vec!["x".into(), el(field)],
            )
            .unwrap()
        };
        assert_eq!(make(), make());
    }

    #[test]
    fn test_create_element_uses_current_scope() {
        let registry = ListenerRegistry::new();
        let cx = context::RenderContext::scope(registry.clone());
        let node = context::enter(cx, || {
            create_element(
                Tag::Button,
                props! { "customId" => "scoped" }.on_click(|_, _| async { Ok(()) }),
                vec!["Go".into()],
            )
        })
        .unwrap();
        assert!(matches!(node, Node::Element(Resolved::Button(_))));
        assert!(registry.contains("scoped"));
    }

    #[test]
    fn test_message_collects_children() {
        let (b, _) = builder();
        let embed = b.build(Tag::Embed, props! { "title" => "t" }, vec![]).unwrap();
        let button = b
            .build(Tag::Button, props! { "customId" => "x" }, vec!["X".into()])
            .unwrap();
        let Resolved::Message(message) = b
            .build(
                Tag::Message,
                props! { "ephemeral" => true },
                vec!["hi".into(), el(embed), el(button)],
            )
            .unwrap()
        else {
            panic!("expected message");
        };
        assert_eq!(message.content.as_deref(), Some("hi"));
        assert_eq!(message.embeds.len(), 1);
        assert_eq!(message.components.len(), 1);
        assert!(message.is_ephemeral());
    }
}
