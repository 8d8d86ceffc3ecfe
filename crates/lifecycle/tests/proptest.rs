//! Property-based tests for weft-lifecycle using proptest.

use proptest::prelude::*;
use std::rc::Rc;
use weft_core::{json, ClientError, Document, GraphQlError, InstanceKey, OperationResult, Variables};
use weft_lifecycle::{Context, QueryProps};
use weft_reactive::testing::{MockClient, ObservableCall, ObservableProbe};

const SLOTS: usize = 4;

#[derive(Clone, Debug)]
enum Op {
    Mount(usize),
    Unmount(usize),
    Rerender(usize, u8),
    Emit(usize, u8),
    Fail(usize),
    LateCallback(usize),
    Flush,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..SLOTS).prop_map(Op::Mount),
        (0..SLOTS).prop_map(Op::Unmount),
        (0..SLOTS, 0u8..3).prop_map(|(s, v)| Op::Rerender(s, v)),
        (0..SLOTS, 0u8..3).prop_map(|(s, v)| Op::Emit(s, v)),
        (0..SLOTS).prop_map(Op::Fail),
        (0..16usize).prop_map(Op::LateCallback),
        Just(Op::Flush),
    ]
}

fn vars(n: u8) -> Variables {
    json!({ "n": n }).as_object().cloned().unwrap()
}

struct Mounted {
    props: QueryProps,
    probe: ObservableProbe,
}

struct Harness {
    ctx: Context,
    client: MockClient,
    slots: Vec<Option<Mounted>>,
    destroyed: Vec<(InstanceKey, ObservableProbe)>,
}

impl Harness {
    fn new() -> Self {
        let client = MockClient::new();
        Self {
            ctx: Context::default().with_client(Rc::new(client.clone())),
            client,
            slots: (0..SLOTS).map(|_| None).collect(),
            destroyed: Vec::new(),
        }
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Mount(slot) => {
                if self.slots[slot].is_some() {
                    return;
                }
                let key = self.ctx.allocate_query_key(Some("slot"));
                let props = QueryProps::new(key.clone(), Document::new("query Q($n: Int) { n }"))
                    .with_variables(vars(0));
                self.ctx.init_query(props.clone()).unwrap();
                self.ctx.did_mount(&key).unwrap();
                let probe = self.client.last_observable().unwrap();
                self.slots[slot] = Some(Mounted { props, probe });
            }
            Op::Unmount(slot) => {
                if let Some(mounted) = self.slots[slot].take() {
                    assert!(self.ctx.destroy_query(&mounted.props.key));
                    self.destroyed.push((mounted.props.key, mounted.probe));
                }
            }
            Op::Rerender(slot, n) => {
                if let Some(mounted) = self.slots[slot].as_mut() {
                    mounted.props = mounted.props.clone().with_variables(vars(n));
                    self.ctx.will_receive_props(mounted.props.clone()).unwrap();
                }
            }
            Op::Emit(slot, n) => {
                if let Some(mounted) = &self.slots[slot] {
                    mounted.probe.emit(OperationResult::ready(json!({ "n": n })));
                }
            }
            Op::Fail(slot) => {
                if let Some(mounted) = &self.slots[slot] {
                    mounted
                        .probe
                        .fail(ClientError::graphql(vec![GraphQlError::new("boom")]));
                }
            }
            Op::LateCallback(index) => {
                if let Some((_, probe)) = self.destroyed.get(index) {
                    for emitter in probe.emitters() {
                        emitter.next();
                    }
                }
            }
            Op::Flush => {
                self.ctx.flush_all().unwrap();
            }
        }
    }

    fn check(&self) -> Result<(), TestCaseError> {
        for mounted in self.slots.iter().flatten() {
            prop_assert!(mounted.probe.subscriber_count() <= 1);
        }
        for (key, probe) in &self.destroyed {
            prop_assert_eq!(probe.subscriber_count(), 0);
            prop_assert!(self.ctx.query_snapshot(key).is_none());
            prop_assert!(!self.ctx.queries().contains(key));
        }
        prop_assert!(self.ctx.queries().active_subscriptions() <= self.ctx.queries().len());
        Ok(())
    }
}

proptest! {
    /// No sequence of lifecycle events leaves two subscriptions on one key,
    /// and destroyed instances never reappear in the store.
    #[test]
    fn at_most_one_subscription_per_key(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut harness = Harness::new();
        for op in &ops {
            harness.apply(op);
            harness.check()?;
        }
        harness.ctx.flush_all().unwrap();
        harness.check()?;

        let live = harness.slots.iter().flatten().count();
        prop_assert_eq!(harness.ctx.store().queries().len(), live);
        prop_assert_eq!(harness.ctx.queries().active_subscriptions(), live);
    }

    /// Rendering with unchanged props touches nothing.
    #[test]
    fn unchanged_props_are_a_no_op(n in 0u8..10, renders in 1usize..5) {
        let mut harness = Harness::new();
        harness.apply(&Op::Mount(0));
        harness.apply(&Op::Rerender(0, n));
        let mounted = harness.slots[0].as_ref().unwrap();
        let calls = mounted.probe.calls();
        let props = mounted.props.clone();
        let key = props.key.clone();

        for _ in 0..renders {
            harness.ctx.will_receive_props(props.clone()).unwrap();
            prop_assert!(!harness.ctx.update_variables(&key, vars(n), &vars(n)).unwrap());
        }
        prop_assert_eq!(harness.slots[0].as_ref().unwrap().probe.calls(), calls);
    }

    /// Callbacks after unsubscribe never change the store.
    #[test]
    fn late_callbacks_do_not_mutate_store(emits in 1usize..8) {
        let mut harness = Harness::new();
        harness.apply(&Op::Mount(0));
        harness.apply(&Op::Mount(1));
        harness.apply(&Op::Unmount(0));
        harness.ctx.flush_all().unwrap();
        let revision = harness.ctx.store().revision();

        for _ in 0..emits {
            harness.apply(&Op::LateCallback(0));
        }
        let stats = harness.ctx.flush_all().unwrap();
        prop_assert_eq!(stats.applied, 0);
        prop_assert_eq!(stats.stale, emits);
        prop_assert_eq!(harness.ctx.store().revision(), revision);
    }

    /// A key can be destroyed and initialized again any number of times.
    #[test]
    fn destroy_then_init_reinitializes(cycles in 1usize..6) {
        let client = MockClient::new();
        let mut ctx = Context::default().with_client(Rc::new(client.clone()));
        let key = InstanceKey::new("q-reused").unwrap();
        let props = QueryProps::new(key.clone(), Document::new("{ ping }"));

        for cycle in 0..cycles {
            prop_assert!(ctx.init_query(props.clone()).unwrap());
            ctx.did_mount(&key).unwrap();
            let probe = client.last_observable().unwrap();
            prop_assert_eq!(client.observable_count(), cycle + 1);
            prop_assert_eq!(probe.subscriber_count(), 1);
            prop_assert!(ctx.query_snapshot(&key).unwrap().loading);

            probe.emit(OperationResult::ready(json!({ "ping": cycle })));
            ctx.flush_all().unwrap();
            prop_assert_eq!(ctx.query_snapshot(&key).unwrap().data.clone(), Some(json!({ "ping": cycle })));

            prop_assert!(ctx.destroy_query(&key));
            prop_assert_eq!(probe.subscriber_count(), 0);
            prop_assert_eq!(
                probe.count_calls(|c| *c == ObservableCall::Unsubscribe),
                1
            );
        }
        prop_assert!(ctx.queries().is_empty());
        prop_assert!(ctx.store().queries().is_empty());
    }
}
