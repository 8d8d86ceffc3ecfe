//! Scriptable in-memory client for tests.
//!
//! [`MockClient`] hands out [`MockObservable`]s and records mutations. Each
//! observable has an [`ObservableProbe`] through which a test plays the
//! server: setting results, emitting notifications and inspecting the calls
//! the lifecycle made.

use crate::client::{Client, ObservableQuery};
use crate::inbox::Emitter;
use crate::subscription::{Subscription, SubscriptionId};
use std::cell::RefCell;
use std::rc::Rc;
use weft_core::{
    ClientError, FetchMoreOptions, MutationRequest, OperationResult, UpdateQueryArgs,
    UpdateQueryFn, Value, Variables, WatchQueryOptions,
};

/// A call made on a mock observable.
#[derive(Clone, Debug, PartialEq)]
pub enum ObservableCall {
    Subscribe,
    Unsubscribe,
    SetOptions(WatchQueryOptions),
    SetVariables(Variables),
    Refetch(Option<Variables>),
    FetchMore(Variables),
    UpdateQuery,
    StartPolling(u64),
    StopPolling,
    ResetLastResults,
    RestoreLastResults,
}

struct ObservableState {
    options: WatchQueryOptions,
    current: OperationResult,
    last_result: Option<OperationResult>,
    last_error: Option<ClientError>,
    subscribers: Vec<(SubscriptionId, Emitter)>,
    emitters: Vec<Emitter>,
    next_sub_id: SubscriptionId,
    calls: Vec<ObservableCall>,
    polling: Option<u64>,
    pending_fetch_more: Option<FetchMoreOptions>,
    fail_next: Option<ClientError>,
}

impl ObservableState {
    fn take_failure(&mut self) -> Result<(), ClientError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn subscriber_emitters(&self) -> Vec<Emitter> {
        self.subscribers
            .iter()
            .map(|(_, e)| e.clone())
            .filter(Emitter::is_connected)
            .collect()
    }
}

/// An observable query backed by test-controlled state.
pub struct MockObservable {
    state: Rc<RefCell<ObservableState>>,
}

impl ObservableQuery for MockObservable {
    fn subscribe(&mut self, emitter: Emitter) -> Subscription {
        let mut state = self.state.borrow_mut();
        let id = state.next_sub_id;
        state.next_sub_id += 1;
        state.subscribers.push((id, emitter.clone()));
        state.emitters.push(emitter.clone());
        state.calls.push(ObservableCall::Subscribe);

        // A settled observable replays to new subscribers right away.
        if let Some(error) = state.last_error.clone() {
            emitter.error(error);
        } else if !state.current.loading {
            emitter.next();
        }

        let weak = Rc::downgrade(&self.state);
        Subscription::new(id, move || {
            if let Some(state) = weak.upgrade() {
                let mut state = state.borrow_mut();
                state.subscribers.retain(|(sub_id, _)| *sub_id != id);
                state.calls.push(ObservableCall::Unsubscribe);
            }
        })
    }

    fn current_result(&self) -> OperationResult {
        self.state.borrow().current.clone()
    }

    fn last_result(&self) -> Option<OperationResult> {
        self.state.borrow().last_result.clone()
    }

    fn last_error(&self) -> Option<ClientError> {
        self.state.borrow().last_error.clone()
    }

    fn reset_last_results(&mut self) {
        let mut state = self.state.borrow_mut();
        state.last_result = None;
        state.last_error = None;
        state.calls.push(ObservableCall::ResetLastResults);
    }

    fn restore_last_results(&mut self, result: Option<OperationResult>, error: Option<ClientError>) {
        let mut state = self.state.borrow_mut();
        state.last_result = result;
        state.last_error = error;
        state.calls.push(ObservableCall::RestoreLastResults);
    }

    fn set_options(&mut self, options: WatchQueryOptions) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ObservableCall::SetOptions(options.clone()));
        state.take_failure()?;
        state.options = options;
        Ok(())
    }

    fn set_variables(&mut self, variables: Variables) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ObservableCall::SetVariables(variables.clone()));
        state.take_failure()?;
        state.options.variables = variables;
        Ok(())
    }

    fn refetch(&mut self, variables: Option<Variables>) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ObservableCall::Refetch(variables.clone()));
        state.take_failure()?;
        if let Some(variables) = variables {
            state.options.variables = variables;
        }
        Ok(())
    }

    fn fetch_more(&mut self, options: FetchMoreOptions) -> Result<(), ClientError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(ObservableCall::FetchMore(options.variables.clone()));
        state.take_failure()?;
        state.pending_fetch_more = Some(options);
        Ok(())
    }

    fn update_query(&mut self, map: UpdateQueryFn) {
        let emitters = {
            let mut state = self.state.borrow_mut();
            state.calls.push(ObservableCall::UpdateQuery);
            let args = UpdateQueryArgs {
                fetch_more_result: None,
                variables: state.options.variables.clone(),
            };
            let previous = state.current.data.clone().unwrap_or(Value::Null);
            state.current.data = Some(map(&previous, &args));
            state.subscriber_emitters()
        };
        for emitter in emitters {
            emitter.next();
        }
    }

    fn start_polling(&mut self, interval_ms: u64) {
        let mut state = self.state.borrow_mut();
        state.polling = Some(interval_ms);
        state.calls.push(ObservableCall::StartPolling(interval_ms));
    }

    fn stop_polling(&mut self) {
        let mut state = self.state.borrow_mut();
        state.polling = None;
        state.calls.push(ObservableCall::StopPolling);
    }

    fn variables(&self) -> Variables {
        self.state.borrow().options.variables.clone()
    }
}

/// Test-side handle to a [`MockObservable`].
#[derive(Clone)]
pub struct ObservableProbe {
    state: Rc<RefCell<ObservableState>>,
}

impl ObservableProbe {
    /// Makes `result` current and notifies every subscriber with `next()`.
    pub fn emit(&self, result: OperationResult) {
        let emitters = {
            let mut state = self.state.borrow_mut();
            if let Some(error) = result.combined_error() {
                state.last_error = Some(error);
            } else if !result.loading {
                state.last_result = Some(result.clone());
                state.last_error = None;
            }
            state.current = result;
            state.subscriber_emitters()
        };
        for emitter in emitters {
            emitter.next();
        }
    }

    /// Fails the stream with `error`, notifying every subscriber.
    pub fn fail(&self, error: ClientError) {
        let emitters = {
            let mut state = self.state.borrow_mut();
            state.last_error = Some(error.clone());
            state.current = OperationResult::failed(error.clone());
            state.subscriber_emitters()
        };
        for emitter in emitters {
            emitter.error(error.clone());
        }
    }

    /// Makes `result` current without notifying anyone.
    pub fn set_current(&self, result: OperationResult) {
        self.state.borrow_mut().current = result;
    }

    /// Sets the last successful result without notifying anyone.
    pub fn set_last_result(&self, result: Option<OperationResult>) {
        self.state.borrow_mut().last_result = result;
    }

    /// Answers the pending `fetch_more` with `page`, merging it through the
    /// caller's `update_query`. Returns false when none is pending.
    pub fn resolve_fetch_more(&self, page: Value) -> bool {
        let Some(options) = self.state.borrow_mut().pending_fetch_more.take() else {
            return false;
        };
        let merged = {
            let state = self.state.borrow();
            let previous = state.current.data.clone().unwrap_or(Value::Null);
            let args = UpdateQueryArgs {
                fetch_more_result: Some(page),
                variables: options.variables.clone(),
            };
            (options.update_query)(&previous, &args)
        };
        self.emit(OperationResult::ready(merged));
        true
    }

    /// Makes the next fallible call fail with `error`.
    pub fn fail_next_call(&self, error: ClientError) {
        self.state.borrow_mut().fail_next = Some(error);
    }

    /// Returns the number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.borrow().subscribers.len()
    }

    /// Returns every emitter ever subscribed, including cancelled ones.
    pub fn emitters(&self) -> Vec<Emitter> {
        self.state.borrow().emitters.clone()
    }

    /// Returns the calls made so far.
    pub fn calls(&self) -> Vec<ObservableCall> {
        self.state.borrow().calls.clone()
    }

    /// Returns how many calls matched `predicate`.
    pub fn count_calls(&self, predicate: impl Fn(&ObservableCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Returns the current options.
    pub fn options(&self) -> WatchQueryOptions {
        self.state.borrow().options.clone()
    }

    /// Returns the poll interval, if polling.
    pub fn polling(&self) -> Option<u64> {
        self.state.borrow().polling
    }

    /// Returns the last error the observable holds.
    pub fn last_error(&self) -> Option<ClientError> {
        self.state.borrow().last_error.clone()
    }

    /// Returns the last successful result the observable holds.
    pub fn last_result(&self) -> Option<OperationResult> {
        self.state.borrow().last_result.clone()
    }
}

/// A mutation handed to the mock client.
#[derive(Clone, Debug)]
pub struct PendingMutation {
    pub request: MutationRequest,
    pub emitter: Emitter,
}

#[derive(Default)]
struct ClientState {
    observables: Vec<ObservableProbe>,
    mutations: Vec<PendingMutation>,
    initial_result: Option<OperationResult>,
    reject_watch: Option<ClientError>,
    reject_mutate: Option<ClientError>,
}

/// A client whose server is the test.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Rc<RefCell<ClientState>>,
}

impl MockClient {
    /// Creates a client whose observables start out loading.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes new observables start with `result` as their current result,
    /// as if it had been read from the cache.
    pub fn with_initial_result(self, result: OperationResult) -> Self {
        self.state.borrow_mut().initial_result = Some(result);
        self
    }

    /// Makes the next `watch_query` fail.
    pub fn reject_next_watch(&self, error: ClientError) {
        self.state.borrow_mut().reject_watch = Some(error);
    }

    /// Makes the next `mutate` fail synchronously.
    pub fn reject_next_mutation(&self, error: ClientError) {
        self.state.borrow_mut().reject_mutate = Some(error);
    }

    /// Returns the number of observables created.
    pub fn observable_count(&self) -> usize {
        self.state.borrow().observables.len()
    }

    /// Returns the probe of the `index`-th observable created.
    pub fn observable(&self, index: usize) -> Option<ObservableProbe> {
        self.state.borrow().observables.get(index).cloned()
    }

    /// Returns the probe of the most recently created observable.
    pub fn last_observable(&self) -> Option<ObservableProbe> {
        self.state.borrow().observables.last().cloned()
    }

    /// Returns the mutations started so far.
    pub fn mutations(&self) -> Vec<PendingMutation> {
        self.state.borrow().mutations.clone()
    }

    /// Completes the `index`-th mutation, running its `update` callback.
    /// Returns false if there is no such mutation.
    pub fn complete_mutation(&self, index: usize, result: OperationResult) -> bool {
        let Some(pending) = self.state.borrow().mutations.get(index).cloned() else {
            return false;
        };
        if let (Some(update), Some(data)) = (&pending.request.update, &result.data) {
            update(data);
        }
        pending.emitter.completed(result);
        true
    }

    /// Rejects the `index`-th mutation. Returns false if there is no such
    /// mutation.
    pub fn fail_mutation(&self, index: usize, error: ClientError) -> bool {
        let Some(pending) = self.state.borrow().mutations.get(index).cloned() else {
            return false;
        };
        pending.emitter.failed(error);
        true
    }
}

impl Client for MockClient {
    fn watch_query(&self, options: WatchQueryOptions) -> Result<Box<dyn ObservableQuery>, ClientError> {
        let mut client = self.state.borrow_mut();
        if let Some(err) = client.reject_watch.take() {
            return Err(err);
        }
        let current = client
            .initial_result
            .clone()
            .unwrap_or_else(OperationResult::loading);
        let last_result = if current.loading || current.combined_error().is_some() {
            None
        } else {
            Some(current.clone())
        };
        let state = Rc::new(RefCell::new(ObservableState {
            options,
            current,
            last_result,
            last_error: None,
            subscribers: Vec::new(),
            emitters: Vec::new(),
            next_sub_id: 1,
            calls: Vec::new(),
            polling: None,
            pending_fetch_more: None,
            fail_next: None,
        }));
        client.observables.push(ObservableProbe {
            state: state.clone(),
        });
        Ok(Box::new(MockObservable { state }))
    }

    fn mutate(&self, request: MutationRequest, emitter: Emitter) -> Result<(), ClientError> {
        let mut client = self.state.borrow_mut();
        if let Some(err) = client.reject_mutate.take() {
            return Err(err);
        }
        client.mutations.push(PendingMutation { request, emitter });
        Ok(())
    }
}
