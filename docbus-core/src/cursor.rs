//! Lazy, forward-only iteration over query results.

use std::{
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};

use futures::{Stream, StreamExt, ready, stream::BoxStream};

use crate::{
    document::{Document, DocumentExt},
    error::StoreResult,
};

/// A single-pass stream of raw documents produced by a find.
///
/// Results are fetched as the cursor is polled; dropping the cursor abandons
/// whatever remains. There is no way to rewind.
pub struct DocumentCursor {
    inner: BoxStream<'static, StoreResult<bson::Document>>,
}

impl DocumentCursor {
    /// Wraps a backend's result stream.
    pub fn new(inner: BoxStream<'static, StoreResult<bson::Document>>) -> Self {
        Self { inner }
    }

    /// Pulls the next document, or `None` once the results are exhausted.
    pub async fn try_next(&mut self) -> StoreResult<Option<bson::Document>> {
        self.inner.next().await.transpose()
    }

    /// Adapts the cursor to deserialize each yielded document into `D`.
    pub fn typed<D: Document>(self) -> TypedCursor<D> {
        TypedCursor {
            inner: self,
            marker: PhantomData,
        }
    }
}

impl Stream for DocumentCursor {
    type Item = StoreResult<bson::Document>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().inner.poll_next_unpin(cx)
    }
}

/// A [`DocumentCursor`] that deserializes every document into `D`.
pub struct TypedCursor<D> {
    inner: DocumentCursor,
    marker: PhantomData<fn() -> D>,
}

impl<D: Document> TypedCursor<D> {
    /// Pulls the next value, or `None` once the results are exhausted.
    pub async fn try_next(&mut self) -> StoreResult<Option<D>> {
        match self.inner.try_next().await? {
            Some(document) => Ok(Some(D::from_document(document)?)),
            None => Ok(None),
        }
    }
}

impl<D: Document> Stream for TypedCursor<D> {
    type Item = StoreResult<D>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let next = ready!(self.get_mut().inner.poll_next_unpin(cx));
        Poll::Ready(next.map(|result| result.and_then(D::from_document)))
    }
}
