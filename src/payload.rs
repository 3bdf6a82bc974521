//! Turning rendered output into something a transport can deliver.

use crate::builder::leaf_kind;
use crate::element::{Node, Resolved};
use crate::error::{TsxError, TsxResult};
use crate::platform::{ActionRow, MessagePayload, Modal, RowComponent};

/// What a caller hands to the dispatch wrapper.
#[derive(Debug)]
pub enum Outgoing {
    /// A ready platform payload.
    Payload(MessagePayload),
    /// Rendered output still to be collected into a payload.
    Node(Node),
}

impl Outgoing {
    pub fn into_payload(self) -> TsxResult<MessagePayload> {
        match self {
            Outgoing::Payload(payload) => Ok(payload),
            Outgoing::Node(node) => collect(node.flatten()?),
        }
    }

    pub fn into_modal(self) -> TsxResult<Modal> {
        match self {
            Outgoing::Payload(_) => Err(TsxError::NotAModal {
                kind: "message".to_string(),
            }),
            Outgoing::Node(node) => into_modal(node),
        }
    }
}

impl From<MessagePayload> for Outgoing {
    fn from(payload: MessagePayload) -> Self {
        Outgoing::Payload(payload)
    }
}

impl From<Resolved> for Outgoing {
    fn from(element: Resolved) -> Self {
        Outgoing::Node(Node::Element(element))
    }
}

impl From<Node> for Outgoing {
    fn from(node: Node) -> Self {
        Outgoing::Node(node)
    }
}

impl From<&str> for Outgoing {
    fn from(text: &str) -> Self {
        Outgoing::Payload(MessagePayload::content(text))
    }
}

impl From<String> for Outgoing {
    fn from(text: String) -> Self {
        Outgoing::Payload(MessagePayload::content(text))
    }
}

/// Assemble flattened leaves into one message.
///
/// Text and emoji append to the content, embeds and rows keep their order,
/// and a bare button or select is wrapped in a row of its own. A nested
/// `<message>` merges into the outer one.
pub fn collect(leaves: Vec<Node>) -> TsxResult<MessagePayload> {
    let mut payload = MessagePayload::default();
    for leaf in leaves {
        match leaf {
            Node::Text(text) => payload.push_content(&text),
            Node::Element(element) => match element {
                Resolved::Message(message) => merge(&mut payload, message),
                Resolved::Embed(embed) => payload.embeds.push(embed),
                Resolved::Row(row) => payload.components.push(row),
                Resolved::Button(button) => payload
                    .components
                    .push(ActionRow::new(vec![RowComponent::Button(button)])),
                Resolved::Select(select) => payload
                    .components
                    .push(ActionRow::new(vec![RowComponent::Select(select)])),
                other => match other.as_fragment() {
                    Some(fragment) => payload.push_content(&fragment),
                    None => {
                        return Err(TsxError::NotAMessage {
                            kind: other.kind().to_string(),
                        })
                    }
                },
            },
            other => {
                return Err(TsxError::NotAMessage {
                    kind: leaf_kind(&other).to_string(),
                })
            }
        }
    }
    Ok(payload)
}

fn merge(payload: &mut MessagePayload, message: MessagePayload) {
    let ephemeral = message.is_ephemeral();
    if let Some(content) = &message.content {
        payload.push_content(content);
    }
    payload.embeds.extend(message.embeds);
    payload.components.extend(message.components);
    payload.tts |= message.tts;
    if ephemeral {
        payload.set_ephemeral(true);
    }
}

/// The output must be exactly one `<modal>`.
pub fn into_modal(node: Node) -> TsxResult<Modal> {
    let mut leaves = node.flatten()?.into_iter();
    let kind = match (leaves.next(), leaves.next()) {
        (Some(Node::Element(Resolved::Modal(modal))), None) => return Ok(modal),
        (Some(_), Some(_)) => "fragment",
        (Some(first), None) => leaf_kind(&first),
        (None, _) => "empty",
    };
    Err(TsxError::NotAModal {
        kind: kind.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::fragment;
    use crate::platform::{Button, ButtonStyle, Embed, Emoji};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_mixed_children() {
        let mut button = Button::new(ButtonStyle::Secondary);
        button.set_custom_id("b").set_label("B");
        let embed = Embed {
            title: Some("t".into()),
            ..Default::default()
        };
        let node = fragment([
            "Hello ".into(),
            Resolved::Emoji(Emoji::unicode("👋")).into(),
            Resolved::Embed(embed.clone()).into(),
            Resolved::Button(button).into(),
        ]);
        let payload = Outgoing::from(node).into_payload().unwrap();
        assert_eq!(payload.content.as_deref(), Some("Hello 👋"));
        assert_eq!(payload.embeds, vec![embed]);
        assert_eq!(payload.components.len(), 1);
    }

    #[test]
    fn test_nested_message_merges() {
        let mut inner = MessagePayload::content("inner");
        inner.set_ephemeral(true);
        inner.tts = true;
        inner.embeds.push(Embed::default());
        let node = fragment(["outer ".into(), Resolved::Message(inner).into()]);
        let payload = Outgoing::from(node).into_payload().unwrap();
        assert_eq!(payload.content.as_deref(), Some("outer inner"));
        assert_eq!(payload.embeds.len(), 1);
        assert!(payload.tts);
        assert!(payload.is_ephemeral());
    }

    #[test]
    fn test_modal_is_not_a_message() {
        let modal = Modal {
            custom_id: "m".into(),
            title: "T".into(),
            components: vec![],
        };
        let result = Outgoing::from(Resolved::Modal(modal.clone())).into_payload();
        assert!(matches!(result, Err(TsxError::NotAMessage { kind }) if kind == "modal"));

        let shown = Outgoing::from(Resolved::Modal(modal.clone())).into_modal().unwrap();
        assert_eq!(shown, modal);
    }

    #[test]
    fn test_into_modal_rejects_text() {
        let result = into_modal("not a modal".into());
        assert!(matches!(result, Err(TsxError::NotAModal { .. })));
    }

    #[test]
    fn test_plain_string_becomes_content() {
        let payload = Outgoing::from("pong").into_payload().unwrap();
        assert_eq!(payload, MessagePayload::content("pong"));
    }
}
