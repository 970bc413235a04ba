use serde_json::Value as JsonValue;

use crate::{client::DEFAULT_ENVELOPE_KEY, GettrClient, Params, Result};

type PageSizeFn = Box<dyn Fn(&JsonValue) -> usize + Send + Sync>;

/// Lazy offset-paginated page sequence built by
/// [`GettrClient::get_paginated`].
///
/// Each [`Pages::next_page`] call injects the current offset into the query
/// parameters (overwriting any prior value of that key), fetches one page
/// through the retry engine, and advances the offset by the configured step.
/// The sequence ends after the first page whose page-size function reports 0
/// — that page itself is still yielded — or when a fetch fails, in which
/// case the error is yielded once and the sequence ends. A finished sequence
/// can only be restarted by building a new `Pages`.
pub struct Pages<'a> {
    client: &'a GettrClient,
    path: String,
    params: Params,
    retries: u32,
    envelope_key: String,
    offset_param: String,
    offset: u64,
    offset_step: u64,
    page_size: PageSizeFn,
    finished: bool,
}

impl<'a> Pages<'a> {
    pub(crate) fn new(client: &'a GettrClient, path: String, params: Params) -> Self {
        Self {
            client,
            path,
            params,
            retries: client.options().retries,
            envelope_key: DEFAULT_ENVELOPE_KEY.to_owned(),
            offset_param: "offset".to_owned(),
            offset: 0,
            offset_step: 20,
            page_size: Box::new(default_page_size),
            finished: false,
        }
    }

    /// Query key carrying the page offset. Default `"offset"`.
    pub fn offset_param(mut self, key: impl Into<String>) -> Self {
        self.offset_param = key.into();
        self
    }

    /// Offset of the first page. Default 0.
    pub fn offset_start(mut self, start: u64) -> Self {
        self.offset = start;
        self
    }

    /// Offset advance per page. Default 20.
    pub fn offset_step(mut self, step: u64) -> Self {
        self.offset_step = step;
        self
    }

    /// Retry budget forwarded to each page fetch.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Success-envelope key forwarded to each page fetch. Default `"result"`.
    pub fn envelope_key(mut self, key: impl Into<String>) -> Self {
        self.envelope_key = key.into();
        self
    }

    /// Counts results in a page payload; a count of 0 ends the sequence.
    ///
    /// The default counts the payload's `data.list` array, the platform's
    /// usual shape. Endpoints with a different shape override this.
    pub fn page_size<F>(mut self, count: F) -> Self
    where
        F: Fn(&JsonValue) -> usize + Send + Sync + 'static,
    {
        self.page_size = Box::new(count);
        self
    }

    /// Fetches the next page, or `None` once the sequence has ended.
    pub async fn next_page(&mut self) -> Option<Result<JsonValue>> {
        if self.finished {
            return None;
        }

        self.params.set(&self.offset_param, self.offset);
        self.offset += self.offset_step;

        match self
            .client
            .get_with(&self.path, &self.params, self.retries, &self.envelope_key)
            .await
        {
            Ok(payload) => {
                if (self.page_size)(&payload) == 0 {
                    self.finished = true;
                }
                Some(Ok(payload))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }

    /// Drains the sequence into a vector, stopping at the first error.
    pub async fn try_collect(mut self) -> Result<Vec<JsonValue>> {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await {
            pages.push(page?);
        }
        Ok(pages)
    }
}

fn default_page_size(payload: &JsonValue) -> usize {
    payload
        .pointer("/data/list")
        .and_then(JsonValue::as_array)
        .map_or(0, Vec::len)
}
