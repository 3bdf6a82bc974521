use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::command::{ApplicationCommand, CommandChoice, CommandOption, OptionKind};
use crate::error::{TsxError, TsxResult};
use crate::platform::*;

/// The closed set of intrinsic element tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Message,
    Br,
    Embed,
    Footer,
    Field,
    Emoji,
    Row,
    Button,
    Select,
    Option,
    Modal,
    Input,
    Command,
    Subcommand,
    SubcommandGroup,
    /// A typed command option (`<string>`, `<integer>`, ...).
    CommandOption(OptionKind),
    Choice,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Message => "message",
            Tag::Br => "br",
            Tag::Embed => "embed",
            Tag::Footer => "footer",
            Tag::Field => "field",
            Tag::Emoji => "emoji",
            Tag::Row => "row",
            Tag::Button => "button",
            Tag::Select => "select",
            Tag::Option => "option",
            Tag::Modal => "modal",
            Tag::Input => "input",
            Tag::Command => "command",
            Tag::Subcommand => "subcommand",
            Tag::SubcommandGroup => "subcommandgroup",
            Tag::CommandOption(kind) => kind.tag_name(),
            Tag::Choice => "choice",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tag {
    type Err = TsxError;

    fn from_str(s: &str) -> TsxResult<Self> {
        let tag = match s {
            "message" => Tag::Message,
            "br" => Tag::Br,
            "embed" => Tag::Embed,
            "footer" => Tag::Footer,
            "field" => Tag::Field,
            "emoji" => Tag::Emoji,
            "row" => Tag::Row,
            "button" => Tag::Button,
            "select" => Tag::Select,
            "option" => Tag::Option,
            "modal" => Tag::Modal,
            "input" => Tag::Input,
            "command" => Tag::Command,
            "subcommand" => Tag::Subcommand,
            "subcommandgroup" => Tag::SubcommandGroup,
            "choice" => Tag::Choice,
            other => match OptionKind::from_tag_name(other) {
                Some(kind) => Tag::CommandOption(kind),
                None => {
                    return Err(TsxError::InvalidTag {
                        tag: other.to_string(),
                    })
                }
            },
        };
        Ok(tag)
    }
}

/// Platform-ready output of building one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    Message(MessagePayload),
    Text(String),
    Embed(Embed),
    Footer(EmbedFooter),
    Field(EmbedField),
    Emoji(Emoji),
    Row(ActionRow),
    Button(Button),
    Select(SelectMenu),
    Option(SelectOption),
    Modal(Modal),
    Input(TextInput),
    Command(ApplicationCommand),
    CommandOption(CommandOption),
    Choice(CommandChoice),
}

impl Resolved {
    /// Name of the element kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Resolved::Message(_) => "message",
            Resolved::Text(_) => "text",
            Resolved::Embed(_) => "embed",
            Resolved::Footer(_) => "footer",
            Resolved::Field(_) => "field",
            Resolved::Emoji(_) => "emoji",
            Resolved::Row(_) => "row",
            Resolved::Button(_) => "button",
            Resolved::Select(_) => "select",
            Resolved::Option(_) => "option",
            Resolved::Modal(_) => "modal",
            Resolved::Input(_) => "input",
            Resolved::Command(_) => "command",
            Resolved::CommandOption(_) => "option",
            Resolved::Choice(_) => "choice",
        }
    }

    /// String form when placed in a text context, if the element has one.
    pub fn as_fragment(&self) -> Option<String> {
        match self {
            Resolved::Text(text) => Some(text.clone()),
            Resolved::Emoji(emoji) => Some(emoji.mention()),
            _ => None,
        }
    }
}

/// A nested sub-component that is rendered in place when its parent is built.
pub trait Render: Send {
    fn render(&self) -> TsxResult<Node>;
}

impl<F> Render for F
where
    F: Fn() -> TsxResult<Node> + Send,
{
    fn render(&self) -> TsxResult<Node> {
        self()
    }
}

/// A child passed to `create_element`.
pub enum Node {
    Empty,
    Text(String),
    Element(Resolved),
    Fragment(Vec<Node>),
    Component(Box<dyn Render>),
}

impl Node {
    pub fn component(component: impl Render + 'static) -> Self {
        Node::Component(Box::new(component))
    }

    /// Flatten nested fragments and render sub-components, yielding leaves in order.
    pub fn flatten(self) -> TsxResult<Vec<Node>> {
        let mut out = Vec::new();
        self.flatten_into(&mut out)?;
        Ok(out)
    }

    fn flatten_into(self, out: &mut Vec<Node>) -> TsxResult<()> {
        match self {
            Node::Empty => {}
            Node::Fragment(children) => {
                for child in children {
                    child.flatten_into(out)?;
                }
            }
            Node::Component(component) => component.render()?.flatten_into(out)?,
            Node::Element(Resolved::Text(text)) | Node::Text(text) => out.push(Node::Text(text)),
            leaf => out.push(leaf),
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => f.write_str("Empty"),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Node::Fragment(children) => f.debug_tuple("Fragment").field(children).finish(),
            Node::Component(_) => f.write_str("Component(..)"),
        }
    }
}

/// Group children without a wrapping element.
pub fn fragment(children: impl IntoIterator<Item = Node>) -> Node {
    Node::Fragment(children.into_iter().collect())
}

impl From<Resolved> for Node {
    fn from(element: Resolved) -> Self {
        Node::Element(element)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<Vec<Node>> for Node {
    fn from(children: Vec<Node>) -> Self {
        Node::Fragment(children)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(child: Option<T>) -> Self {
        child.map(Into::into).unwrap_or(Node::Empty)
    }
}

macro_rules! node_from_number {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Node {
            fn from(n: $ty) -> Self {
                Node::Text(n.to_string())
            }
        })*
    };
}

node_from_number!(i32, i64, u32, u64, usize, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip_names() {
        for name in ["embed", "button", "subcommandgroup", "integer", "attachment"] {
            let tag: Tag = name.parse().unwrap();
            assert_eq!(tag.as_str(), name);
        }
    }

    #[test]
    fn test_unknown_tag() {
        let result = "div".parse::<Tag>();
        assert!(matches!(result, Err(TsxError::InvalidTag { tag }) if tag == "div"));
    }

    #[test]
    fn test_flatten_nested_fragments_and_components() {
        let node = fragment([
            "a".into(),
            fragment([fragment(["b".into()]), Node::Empty, 3.into()]),
            Node::component(|| Ok(fragment(["c".into(), "d".into()]))),
        ]);
        let leaves: Vec<String> = node
            .flatten()
            .unwrap()
            .into_iter()
            .map(|n| match n {
                Node::Text(t) => t,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(leaves, vec!["a", "b", "3", "c", "d"]);
    }

    #[test]
    fn test_component_error_propagates_through_flatten() {
        let node = fragment([Node::component(|| Err(TsxError::render("boom")))]);
        assert!(matches!(node.flatten(), Err(TsxError::Render(_))));
    }
}
