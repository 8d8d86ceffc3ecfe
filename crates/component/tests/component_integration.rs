//! Integration tests for Query and Mutation components.
//!
//! A tiny keyed renderer stands in for the UI framework: it renders a list
//! of components, runs `oncreate` for new keys and `onremove`/`ondestroy`
//! for keys that disappeared.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use weft_component::{
    mutation, query, Child, HookKind, LifecycleHooks, Mutation, Query, VNode, View,
};
use weft_core::{json, ClientError, Document, Map, MutationOptions, OperationResult, Value};
use weft_lifecycle::Context;
use weft_reactive::testing::MockClient;

enum Component {
    Query(Query),
    Mutation(Mutation),
}

impl Component {
    fn render(&self, ctx: &mut Context) -> Option<VNode> {
        match self {
            Component::Query(q) => q.render(ctx, &[]).unwrap(),
            Component::Mutation(m) => m.render(ctx, &[]).unwrap(),
        }
    }
}

#[derive(Default)]
struct Renderer {
    mounted: BTreeMap<String, VNode>,
    next_element: u64,
}

impl Renderer {
    /// Renders every component and patches the mounted tree.
    fn render(&mut self, ctx: &mut Context, components: &[Component]) -> Vec<VNode> {
        let nodes: Vec<VNode> = components.iter().filter_map(|c| c.render(ctx)).collect();

        let keys: Vec<String> = nodes.iter().filter_map(|n| n.key().map(str::to_string)).collect();
        let gone: Vec<String> = self
            .mounted
            .keys()
            .filter(|k| !keys.contains(k))
            .cloned()
            .collect();
        for key in gone {
            if let Some(node) = self.mounted.remove(&key) {
                node.attributes.hooks.run(HookKind::Remove, ctx, 0).unwrap();
                node.attributes.hooks.run(HookKind::Destroy, ctx, 0).unwrap();
            }
        }
        for node in &nodes {
            let key = node.key().unwrap_or_default().to_string();
            if !self.mounted.contains_key(&key) {
                self.next_element += 1;
                node.attributes
                    .hooks
                    .run(HookKind::Create, ctx, self.next_element)
                    .unwrap();
            }
            self.mounted.insert(key, node.clone());
        }
        nodes
    }
}

fn attrs(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn text_of(node: &VNode) -> String {
    match node.children.first() {
        Some(Child::Text(text)) => text.clone(),
        _ => String::new(),
    }
}

fn pokemon_view(name: &str) -> impl Fn(&weft_component::QueryRenderProps, &[Child]) -> View {
    let fallback = name.to_string();
    move |props, _| {
        let label = if props.loading {
            format!("loading {}", fallback)
        } else {
            props
                .data
                .as_ref()
                .and_then(|d| d["pokemon"]["name"].as_str())
                .unwrap_or("?")
                .to_string()
        };
        VNode::new("li").with_text(label).into()
    }
}

#[test]
fn test_list_of_queries_from_one_definition() {
    let client = MockClient::new();
    let mut ctx = Context::default().with_client(Rc::new(client.clone()));
    let mut renderer = Renderer::default();
    let pokemon = query(Document::new("query P($name: String) { pokemon(name: $name) { name } }"));

    let list = |names: &[&str]| -> Vec<Component> {
        names
            .iter()
            .map(|name| {
                let attributes = attrs(json!({"key": name, "variables": {"name": name}}));
                Component::Query(pokemon.view(&attributes, pokemon_view(name)).unwrap())
            })
            .collect()
    };

    // First pass registers, second pass renders and mounts.
    assert!(renderer.render(&mut ctx, &list(&["pikachu", "eevee"])).is_empty());
    let nodes = renderer.render(&mut ctx, &list(&["pikachu", "eevee"]));
    assert_eq!(nodes.len(), 2);
    assert_eq!(text_of(&nodes[0]), "loading pikachu");
    assert_eq!(client.observable_count(), 2);
    assert_ne!(nodes[0].key(), nodes[1].key());

    client
        .observable(0)
        .unwrap()
        .emit(OperationResult::ready(json!({"pokemon": {"name": "Pikachu"}})));
    ctx.flush().unwrap();
    let nodes = renderer.render(&mut ctx, &list(&["pikachu", "eevee"]));
    assert_eq!(text_of(&nodes[0]), "Pikachu");
    assert_eq!(text_of(&nodes[1]), "loading eevee");

    // Dropping eevee from the list unsubscribes it.
    renderer.render(&mut ctx, &list(&["pikachu"]));
    assert_eq!(client.observable(1).unwrap().subscriber_count(), 0);
    assert_eq!(client.observable(0).unwrap().subscriber_count(), 1);
    assert_eq!(ctx.queries().len(), 1);
    assert_eq!(ctx.store().queries().len(), 1);
}

#[test]
fn test_mutation_button_round_trip() {
    let client = MockClient::new();
    let mut ctx = Context::default().with_client(Rc::new(client.clone()));
    let mut renderer = Renderer::default();
    let catch = mutation(Document::new("mutation Catch($id: Int!) { catch(id: $id) { id } }"));

    let completed = Rc::new(RefCell::new(Vec::new()));
    let sink = completed.clone();
    let props = catch
        .props_from_attributes(&attrs(json!({"variables": {"id": 25}})))
        .unwrap()
        .on_completed(move |data| sink.borrow_mut().push(data.clone()));
    let button = Mutation::new(props, |props, _| {
        let label = match (props.called, props.loading) {
            (false, _) => "catch",
            (true, true) => "catching",
            (true, false) => "caught",
        };
        VNode::new("button").with_text(label).into()
    });
    let tree = [Component::Mutation(button)];

    assert!(renderer.render(&mut ctx, &tree).is_empty());
    let nodes = renderer.render(&mut ctx, &tree);
    assert_eq!(text_of(&nodes[0]), "catch");

    // The click handler runs the mutation through the controls.
    let key = catch.key(None);
    weft_component::MutationControls::new(key.clone())
        .execute(&mut ctx, &MutationOptions::new())
        .unwrap();
    assert_eq!(text_of(&renderer.render(&mut ctx, &tree)[0]), "catching");
    assert_eq!(
        client.mutations()[0].request.variables,
        attrs(json!({"id": 25}))
    );

    client.complete_mutation(0, OperationResult::ready(json!({"catch": {"id": 25}})));
    ctx.flush().unwrap();
    assert_eq!(text_of(&renderer.render(&mut ctx, &tree)[0]), "caught");
    assert_eq!(completed.borrow().len(), 1);

    renderer.render(&mut ctx, &[]);
    assert!(ctx.mutation_state(&key).is_none());
    assert!(ctx.mutations().is_empty());
}

#[test]
fn test_user_hooks_run_after_component_hooks() {
    let client = MockClient::new();
    let mut ctx = Context::default().with_client(Rc::new(client.clone()));
    let log = Rc::new(RefCell::new(Vec::new()));

    let sink = log.clone();
    let component = query(Document::new("{ ping }"));
    let view = component
        .view(&Map::new(), move |_, _| {
            let created = sink.clone();
            let removed = sink.clone();
            VNode::new("div")
                .with_hooks(
                    LifecycleHooks::new()
                        .oncreate(move |ctx: &mut Context, _| {
                            // the component already mounted the query
                            let key = ctx.queries().get(&ctx_key(ctx)).map(|e| e.has_mounted());
                            created.borrow_mut().push(format!("create {:?}", key));
                            Ok(())
                        })
                        .onremove(move |_, _| {
                            removed.borrow_mut().push("remove".to_string());
                            Ok(())
                        }),
                )
                .into()
        })
        .unwrap();

    assert!(view.render(&mut ctx, &[]).unwrap().is_none());
    let node = view.render(&mut ctx, &[]).unwrap().unwrap();
    node.attributes.hooks.run(HookKind::Create, &mut ctx, 1).unwrap();
    node.attributes.hooks.run(HookKind::Remove, &mut ctx, 1).unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["create Some(true)".to_string(), "remove".to_string()]
    );
    assert!(ctx.queries().is_empty());
}

/// The only query key in the context.
fn ctx_key(ctx: &Context) -> weft_core::InstanceKey {
    ctx.store().queries().keys().next().cloned().unwrap()
}

#[test]
fn test_skip_attribute_defers_subscription() {
    let client = MockClient::new();
    let mut ctx = Context::default().with_client(Rc::new(client.clone()));
    let mut renderer = Renderer::default();
    let component = query(Document::new("{ me { id } }"));

    let tree = |skip: bool| {
        vec![Component::Query(
            component
                .view(&attrs(json!({"skip": skip})), |_, _| VNode::new("span").into())
                .unwrap(),
        )]
    };

    renderer.render(&mut ctx, &tree(true));
    renderer.render(&mut ctx, &tree(true));
    let probe = client.last_observable().unwrap();
    assert_eq!(probe.subscriber_count(), 0);

    renderer.render(&mut ctx, &tree(false));
    assert_eq!(probe.subscriber_count(), 1);

    renderer.render(&mut ctx, &tree(true));
    assert_eq!(probe.subscriber_count(), 0);
}

#[test]
fn test_network_error_surfaces_from_flush() {
    let client = MockClient::new();
    let mut ctx = Context::default().with_client(Rc::new(client.clone()));
    let mut renderer = Renderer::default();
    let component = query(Document::new("{ me { id } }"));
    let tree = vec![Component::Query(
        component
            .view(&Map::new(), |props, _| {
                VNode::new("span")
                    .with_prop("error", json!(props.error.as_ref().map(|e| e.message())))
                    .into()
            })
            .unwrap(),
    )];

    renderer.render(&mut ctx, &tree);
    renderer.render(&mut ctx, &tree);
    client
        .last_observable()
        .unwrap()
        .fail(ClientError::network("offline"));
    assert!(ctx.flush().is_err());
    ctx.flush_all().unwrap();

    let nodes = renderer.render(&mut ctx, &tree);
    assert_eq!(
        nodes[0].attributes.props["error"],
        json!("Network error: offline")
    );
}
