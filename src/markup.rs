//! Static element trees described as data.
//!
//! A markup document is YAML (or JSON) where each element is a mapping with a
//! `tag`, optional `props` and optional `children`; strings and numbers are text
//! and a sequence is a fragment:
//!
//! ```yaml
//! tag: embed
//! props: { title: Status, color: GREEN }
//! children:
//!   - "All systems nominal"
//!   - tag: field
//!     props: { name: Uptime, inline: true }
//!     children: ["99.9%"]
//! ```
//!
//! Markup cannot carry handlers, so it describes static output only.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::builder::ElementBuilder;
use crate::element::{Node, Tag};
use crate::error::TsxResult;
use crate::payload::Outgoing;
use crate::platform::MessagePayload;
use crate::props::Props;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MarkupNode {
    Text(String),
    Number(Number),
    Fragment(Vec<MarkupNode>),
    Element {
        tag: String,
        #[serde(default)]
        props: Map<String, Value>,
        #[serde(default)]
        children: Vec<MarkupNode>,
    },
}

pub fn parse_markup(source: &str) -> TsxResult<MarkupNode> {
    Ok(serde_yaml::from_str(source)?)
}

impl MarkupNode {
    /// Build bottom-up, as nested `create_element` calls would.
    pub fn build(&self, builder: &ElementBuilder) -> TsxResult<Node> {
        match self {
            MarkupNode::Text(text) => Ok(Node::Text(text.clone())),
            MarkupNode::Number(n) => Ok(Node::Text(n.to_string())),
            MarkupNode::Fragment(children) => children
                .iter()
                .map(|child| child.build(builder))
                .collect::<TsxResult<Vec<_>>>()
                .map(Node::Fragment),
            MarkupNode::Element {
                tag,
                props,
                children,
            } => {
                let tag: Tag = tag.parse()?;
                let children = children
                    .iter()
                    .map(|child| child.build(builder))
                    .collect::<TsxResult<Vec<_>>>()?;
                builder
                    .build(tag, Props::from_map(props.clone()), children)
                    .map(Node::Element)
            }
        }
    }
}

/// Parse markup and collect it into a message payload.
pub fn render_markup(source: &str) -> TsxResult<MessagePayload> {
    let node = parse_markup(source)?.build(&ElementBuilder::detached())?;
    Outgoing::from(node).into_payload()
}
