//! Generic filtered pagination over remote collections.
//!
//! Every listable Octosend collection (domains, spoolers, spooler events)
//! exposes the same pair of endpoints: a `.../count` returning the number of
//! matching items and a `.../fetch` returning one window of them.
//! [`Filter`] wraps such a pair together with a criteria map and a decoding
//! strategy, and [`Filter::iterate`] turns it into a lazy [`Stream`] that
//! walks the collection in bounded windows.

use crate::client::Client;
use crate::{Error, Result};
use futures::Stream;
use futures::stream;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default window size used by [`Filter::iterate`].
pub const DEFAULT_BATCH_SIZE: u64 = 50;

/// Default page size used by direct [`Filter::fetch`] calls.
pub const DEFAULT_FETCH_LIMIT: u64 = 100;

/// A filtered view over one remote collection.
///
/// Holds a set of named criteria that are merged into every `count` and
/// `fetch` request, and a factory converting each raw record into `T`.
/// Criteria keys are passed through to the API verbatim; no validation
/// happens client-side.
///
/// Obtain instances from [`Client::domains`], [`Client::spoolers`], or
/// [`Spooler::events`](crate::Spooler::events).
pub struct Filter<T> {
    client: Client,
    count_endpoint: String,
    fetch_endpoint: String,
    criteria: Map<String, Value>,
    factory: Arc<dyn Fn(&Client, Value) -> Result<T> + Send + Sync>,
}

impl<T> Filter<T> {
    pub(crate) fn new(
        client: Client,
        count_endpoint: impl Into<String>,
        fetch_endpoint: impl Into<String>,
        factory: impl Fn(&Client, Value) -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            client,
            count_endpoint: count_endpoint.into(),
            fetch_endpoint: fetch_endpoint.into(),
            criteria: Map::new(),
            factory: Arc::new(factory),
        }
    }

    /// Set a single-valued criterion, overwriting any previous value stored
    /// under `key` (including a multi-valued one).
    pub fn set_criterion(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.criteria.insert(key.into(), value.into());
    }

    /// Append a value to the multi-valued criterion `key`, creating it if
    /// absent.
    ///
    /// Insertion order is preserved in the wire payload. If `key` currently
    /// holds a non-array value (set via [`Filter::set_criterion`]), that
    /// value is discarded and a fresh single-element array takes its place:
    /// the last writer decides the criterion's shape.
    pub fn append_criterion(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let slot = self
            .criteria
            .entry(key.into())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Value::Array(values) = slot {
            values.push(value.into());
        }
    }

    /// The criteria currently attached to this filter.
    pub fn criteria(&self) -> &Map<String, Value> {
        &self.criteria
    }

    /// Count the items matching the current criteria.
    pub async fn count(&self) -> Result<u64> {
        let body = Value::Object(self.criteria.clone());
        let response = self.client.call(&self.count_endpoint, Some(&body)).await?;
        response
            .as_u64()
            .ok_or(Error::ResponseParse("count endpoint did not return an integer"))
    }

    /// Fetch one window of up to `limit` items starting at `offset`.
    ///
    /// [`DEFAULT_FETCH_LIMIT`] is the conventional window size for one-off
    /// calls. `reverse` flips the collection order server-side. Pagination
    /// parameters are merged with the criteria; on a key collision the
    /// criterion wins. Each raw record is decoded through the filter's
    /// factory, in order.
    ///
    /// Most callers want [`Filter::iterate`] instead, which manages offsets
    /// and end-of-collection detection.
    pub async fn fetch(&self, offset: u64, limit: u64, reverse: bool) -> Result<Vec<T>> {
        let mut params = Map::new();
        params.insert("offset".to_string(), offset.into());
        params.insert("limit".to_string(), limit.into());
        params.insert("reverse".to_string(), reverse.into());
        for (key, value) in &self.criteria {
            params.insert(key.clone(), value.clone());
        }

        let response = self
            .client
            .call(&self.fetch_endpoint, Some(&Value::Object(params)))
            .await?;
        let Value::Array(rows) = response else {
            return Err(Error::ResponseParse("fetch endpoint did not return an array"));
        };
        rows.into_iter()
            .map(|raw| (self.factory)(&self.client, raw))
            .collect()
    }

    /// Lazily iterate over the matching items in `batch_size`-sized windows.
    ///
    /// Returns a pull-based stream: nothing is fetched until the consumer
    /// polls, at most one fetch is in flight, and dropping the stream early
    /// issues no further requests. The stream ends when the optional `count`
    /// budget is exhausted, or when a window comes back shorter than
    /// requested (the end of the remote collection), whichever happens first.
    ///
    /// A failed fetch ends the stream by yielding the error once; items from
    /// windows fetched before the failure have already been yielded. The
    /// stream is finite and not restartable; build a fresh one to re-read
    /// the collection.
    ///
    /// Offset-based windows are not a snapshot: if the collection mutates
    /// between fetches, items may be skipped or repeated.
    ///
    /// # Examples
    /// ```no_run
    /// # use futures::TryStreamExt;
    /// # use octosend_client::{Client, IterateOptions};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), octosend_client::Error> {
    /// # let client = Client::new("key")?;
    /// let filter = client.domains();
    /// let mut domains = std::pin::pin!(filter.iterate(IterateOptions::new().count(200)));
    /// while let Some(domain) = domains.try_next().await? {
    ///     println!("{}", domain.name());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn iterate(&self, options: IterateOptions) -> impl Stream<Item = Result<T>> + '_ {
        let IterateOptions {
            offset,
            count,
            reverse,
            batch_size,
        } = options;

        let cursor = IterationCursor {
            offset,
            remaining: count,
            page: VecDeque::new(),
            exhausted: false,
        };

        stream::try_unfold(cursor, move |mut cursor| async move {
            loop {
                if let Some(item) = cursor.page.pop_front() {
                    return Ok(Some((item, cursor)));
                }
                if cursor.exhausted {
                    return Ok(None);
                }

                let limit = match cursor.remaining {
                    Some(left) => left.min(batch_size),
                    None => batch_size,
                };
                if limit == 0 {
                    return Ok(None);
                }

                let rows = self.fetch(cursor.offset, limit, reverse).await?;
                let n = rows.len() as u64;
                if n != limit {
                    // Short window: the remote collection ends here. Yield
                    // what came back, then stop without another fetch.
                    cursor.exhausted = true;
                }
                cursor.offset += n;
                if let Some(left) = cursor.remaining.as_mut() {
                    *left = left.saturating_sub(n);
                }
                if rows.is_empty() {
                    return Ok(None);
                }
                cursor.page = rows.into();
            }
        })
    }
}

impl<T> std::fmt::Debug for Filter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("count_endpoint", &self.count_endpoint)
            .field("fetch_endpoint", &self.fetch_endpoint)
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

/// Transient per-iteration state. Lives inside the stream only.
struct IterationCursor<T> {
    offset: u64,
    remaining: Option<u64>,
    page: VecDeque<T>,
    exhausted: bool,
}

/// Windowing parameters for [`Filter::iterate`].
///
/// # Examples
/// ```
/// use octosend_client::IterateOptions;
///
/// let options = IterateOptions::new().count(500).batch_size(100).reverse(true);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterateOptions {
    offset: u64,
    count: Option<u64>,
    reverse: bool,
    batch_size: u64,
}

impl IterateOptions {
    /// Default windowing: start at the beginning, no total budget, natural
    /// order, windows of [`DEFAULT_BATCH_SIZE`].
    pub fn new() -> Self {
        Self {
            offset: 0,
            count: None,
            reverse: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Start iterating at `offset` instead of the collection start.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    /// Yield at most `count` items in total. `0` yields nothing and issues
    /// no fetch.
    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Walk the collection in reverse order.
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Fetch windows of `batch_size` items. No single request ever asks for
    /// more than this. `0` is treated like an exhausted budget.
    pub fn batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size;
        self
    }
}

impl Default for IterateOptions {
    fn default() -> Self {
        Self::new()
    }
}
