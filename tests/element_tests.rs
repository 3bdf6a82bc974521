mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{Call, MockTransport};
use discord_tsx::platform::{ButtonStyle, EmbedField};
use discord_tsx::{
    create_element, fragment, props, Client, ClientOptions, Interaction, InteractionKind, Node,
    Resolved, Tag, TsxError,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn client() -> (Client, Arc<MockTransport>) {
    let transport = MockTransport::new();
    (Client::new(transport.clone(), ClientOptions::default()), transport)
}

#[tokio::test]
async fn test_button_scenario() {
    let (client, _) = client();
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = clicks.clone();

    let node = client
        .scope(|| {
            create_element(
                Tag::Button,
                props! { "customId" => "b1" }.on_click(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                }),
                vec!["Click".into()],
            )
        })
        .unwrap();

    let Node::Element(Resolved::Button(button)) = node else {
        panic!("expected a button");
    };
    assert_eq!(button.label.as_deref(), Some("Click"));
    assert_eq!(button.style, ButtonStyle::Primary);

    let listener = client.registry().get("b1").unwrap();
    assert_eq!(listener.kind, InteractionKind::Button);
    assert_eq!(listener.once, None);

    assert!(client.handle_interaction(Interaction::button("b1")).await.unwrap());
    assert_eq!(clicks.load(Ordering::SeqCst), 1);
    assert!(client.registry().contains("b1"));
}

#[test]
fn test_embed_scenario() {
    let field = create_element(
        Tag::Field,
        props! { "name" => "f1", "value" => "v1" },
        vec![],
    )
    .unwrap();
    let node = create_element(
        Tag::Embed,
        props! {},
        vec!["hello ".into(), field, "world".into()],
    )
    .unwrap();
    let Node::Element(Resolved::Embed(embed)) = node else {
        panic!("expected an embed");
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
fn test_handler_outside_scope_fails() {
    let result = create_element(
        Tag::Button,
        props! { "customId" => "lost" }.on_click(|_, _| async { Ok(()) }),
        vec![],
    );
    assert!(matches!(result, Err(TsxError::NoActiveRegistry { .. })));
}

#[test]
fn test_sub_components_render_in_place() {
    let greeting = |name: &'static str| {
        Node::component(move || Ok(fragment(["Hello, ".into(), name.into(), "! ".into()])))
    };
    let node = create_element(
        Tag::Embed,
        props! { "title" => "Greetings" },
        vec![greeting("Ada"), greeting("Grace")],
    )
    .unwrap();
    let Node::Element(Resolved::Embed(embed)) = node else {
        panic!("expected an embed");
    };
    assert_eq!(embed.description.as_deref(), Some("Hello, Ada! Hello, Grace! "));
}

#[tokio::test]
async fn test_send_collects_message() {
    let (client, transport) = client();
    let node = client
        .scope(|| -> discord_tsx::TsxResult<Node> {
            let embed = create_element(
                Tag::Embed,
                props! { "title" => "Poll", "color" => "BLURPLE" },
                vec!["Pick one".into()],
            )?;
            let yes = create_element(
                Tag::Button,
                props! { "customId" => "yes", "style" => "success" }
                    .on_click(|_, _| async { Ok(()) }),
                vec!["Yes".into()],
            )?;
            let no = create_element(
                Tag::Button,
                props! { "customId" => "no", "style" => "danger" }
                    .on_click(|_, _| async { Ok(()) }),
                vec!["No".into()],
            )?;
            let row = create_element(Tag::Row, props! {}, vec![yes, no])?;
            create_element(Tag::Message, props! { "content" => "Vote!" }, vec![embed, row])
        })
        .unwrap();

    let handle = client.dispatcher().send("general", node).await.unwrap();
    assert_eq!(handle.id, "m1");

    let Some(Call::Send { channel_id, payload }) = transport.last() else {
        panic!("expected a send");
    };
    assert_eq!(channel_id, "general");
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "content": "Vote!",
            "embeds": [{ "title": "Poll", "description": "Pick one", "color": 0x5865f2 }],
            "components": [{
                "type": 1,
                "components": [
                    { "type": 2, "style": 3, "label": "Yes", "custom_id": "yes" },
                    { "type": 2, "style": 4, "label": "No", "custom_id": "no" }
                ]
            }]
        })
    );
    assert_eq!(client.registry().len(), 2);
}

#[tokio::test]
async fn test_transport_error_propagates() {
    let (client, transport) = client();
    transport.fail_next();
    let result = client.dispatcher().send("general", "hello").await;
    assert!(matches!(result, Err(TsxError::Transport(_))));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_modal_cannot_be_sent() {
    let (client, transport) = client();
    let modal = create_element(
        Tag::Modal,
        props! { "customId" => "m", "title" => "Form" },
        vec![],
    )
    .unwrap();
    let result = client.dispatcher().send("general", modal).await;
    assert!(matches!(result, Err(TsxError::NotAMessage { .. })));
    assert_eq!(transport.count(), 0);
}
