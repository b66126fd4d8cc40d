//! Fetch sessions.
//!
//! A session is one full fetch of one resource. It owns its aggregate, its
//! progress sink and its cancellation token, and is consumed by `run`.

use std::marker::PhantomData;

use tokio_util::sync::CancellationToken;

use super::error::SessionError;
use super::orchestrator::{Aggregate, FetchOutcome, PagedFetcher};
use super::progress::ProgressSink;
use crate::comments::CommentIndex;
use crate::resources::{Comments, Resource, Votes, VotesState};

pub struct FetchSession<R: Resource> {
    fetcher: PagedFetcher,
    progress: ProgressSink,
    cancel: CancellationToken,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> FetchSession<R> {
    pub(crate) fn new(fetcher: PagedFetcher, progress: ProgressSink, cancel: CancellationToken) -> Self {
        Self {
            fetcher,
            progress,
            cancel,
            _resource: PhantomData,
        }
    }

    /// A handle that cancels this session when triggered. Useful when `run`
    /// has already taken ownership of the session.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replaces the session's token, e.g. with a child of an app-wide one.
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Runs the session into a fresh aggregate.
    ///
    /// The progress stream ends when this returns.
    pub async fn run<A>(self) -> Result<FetchOutcome<A>, SessionError>
    where
        A: Aggregate<R::Record> + Default,
    {
        let Self {
            fetcher,
            progress,
            cancel,
            ..
        } = self;
        fetcher.fetch_all::<R, A>(&progress, &cancel).await
    }

    /// Runs the session into a flat list.
    pub async fn collect(self) -> Result<FetchOutcome<Vec<R::Record>>, SessionError> {
        self.run().await
    }
}

impl FetchSession<Comments> {
    /// Runs the session, indexing comments as pages arrive.
    pub async fn index(self) -> Result<FetchOutcome<CommentIndex>, SessionError> {
        self.run().await
    }
}

impl FetchSession<Votes> {
    /// Runs the session, reducing votes into a per-song map.
    pub async fn votes(self) -> Result<FetchOutcome<VotesState>, SessionError> {
        self.run().await
    }
}
