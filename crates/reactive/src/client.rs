//! Capabilities Weft needs from a GraphQL client.
//!
//! The client itself (transport, cache, normalization) lives outside Weft.
//! An embedding application adapts its client to these two traits.

use crate::inbox::Emitter;
use crate::subscription::Subscription;
use weft_core::{
    ClientError, FetchMoreOptions, MutationRequest, OperationResult, UpdateQueryFn, Variables,
    WatchQueryOptions,
};

/// A live handle to one GraphQL query, owned by exactly one component
/// instance.
///
/// Implementations report through the [`Emitter`] given to `subscribe`:
/// `next()` whenever `current_result()` changes, `error(..)` when the stream
/// fails. Requests started by `refetch`, `fetch_more` or polling report
/// through the same emitter.
pub trait ObservableQuery {
    /// Starts delivering notifications to `emitter`.
    fn subscribe(&mut self, emitter: Emitter) -> Subscription;

    /// Returns the current result, including partial data while loading.
    fn current_result(&self) -> OperationResult;

    /// Returns the last result delivered without error.
    fn last_result(&self) -> Option<OperationResult>;

    /// Returns the last error delivered.
    fn last_error(&self) -> Option<ClientError>;

    /// Forgets the last result and error.
    fn reset_last_results(&mut self);

    /// Restores a result and error saved before `reset_last_results`.
    fn restore_last_results(&mut self, result: Option<OperationResult>, error: Option<ClientError>);

    /// Replaces the options of the query.
    fn set_options(&mut self, options: WatchQueryOptions) -> Result<(), ClientError>;

    /// Replaces the variables of the query, fetching if needed.
    fn set_variables(&mut self, variables: Variables) -> Result<(), ClientError>;

    /// Refetches, optionally with new variables.
    fn refetch(&mut self, variables: Option<Variables>) -> Result<(), ClientError>;

    /// Loads more data and merges it with `options.update_query`.
    fn fetch_more(&mut self, options: FetchMoreOptions) -> Result<(), ClientError>;

    /// Rewrites the cached data of the query.
    fn update_query(&mut self, map: UpdateQueryFn);

    /// Polls every `interval_ms` milliseconds.
    fn start_polling(&mut self, interval_ms: u64);

    /// Stops polling.
    fn stop_polling(&mut self);

    /// Returns the variables the query currently runs with.
    fn variables(&self) -> Variables;
}

/// The GraphQL client.
pub trait Client {
    /// Creates an observable query.
    fn watch_query(&self, options: WatchQueryOptions) -> Result<Box<dyn ObservableQuery>, ClientError>;

    /// Starts a mutation. The outcome is reported through `emitter` with
    /// `completed(..)` or `failed(..)`; an `Err` means the request was
    /// rejected before it started.
    fn mutate(&self, request: MutationRequest, emitter: Emitter) -> Result<(), ClientError>;
}
