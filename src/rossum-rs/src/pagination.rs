//! Lazy, ordered traversal of paginated list endpoints
//!
//! Pages are fetched one at a time, only once the items of the previous page
//! have been consumed. Dropping the stream abandons the in-flight request and
//! stops the traversal.

use std::collections::HashMap;

use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Url;
use rossum_core::Sideload;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::normalize::decode;
use crate::request::RequestDescriptor;

/// Position of the next page as announced by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Absolute link to the next page, query included
    Url(String),
    /// Opaque token sent back in the `cursor` query parameter
    Token(String),
}

impl Cursor {
    fn from_value(value: &Value) -> Option<Self> {
        let next = value.as_str()?.trim();
        if next.is_empty() {
            return None;
        }
        match Url::parse(next) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Some(Cursor::Url(next.to_string())),
            _ => Some(Cursor::Token(next.to_string())),
        }
    }
}

#[derive(Debug)]
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<Cursor>,
}

/// Decode one list envelope
///
/// Accepts `{"pagination": {"next": ..}, "results": [..]}` as well as the
/// flat `{"next": .., "items": [..]}` shape. Items keep server order; a single
/// undecodable item fails the whole page.
pub(crate) fn parse_page<T: DeserializeOwned>(body: &[u8], sideloads: &[Sideload]) -> Result<Page<T>> {
    let mut envelope = match decode::<Value>(body)? {
        Value::Object(map) => map,
        _ => return Err(Error::decode_message("list response is not a JSON object")),
    };

    let next = envelope
        .get("pagination")
        .and_then(|p| p.get("next"))
        .or_else(|| envelope.get("next"))
        .and_then(Cursor::from_value);

    let mut raw_items = match envelope.remove("results").or_else(|| envelope.remove("items")) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(Error::decode_message(
                "list response carries neither a results nor an items array",
            ))
        }
    };
    merge_sideloads(&mut raw_items, &envelope, sideloads);

    let items = raw_items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(Error::Decode)?;

    Ok(Page { items, next })
}

/// Replace URL references on each item with the matching sideloaded objects
fn merge_sideloads(items: &mut [Value], envelope: &Map<String, Value>, sideloads: &[Sideload]) {
    for sideload in sideloads {
        let Some(Value::Array(loaded)) = envelope.get(sideload.name()) else {
            continue;
        };

        if *sideload == Sideload::Content {
            // datapoints live below `<annotation>/content/<id>`
            for item in items.iter_mut() {
                let Some(prefix) = item
                    .get("content")
                    .and_then(Value::as_str)
                    .map(|url| format!("{}/", url.trim_end_matches('/')))
                else {
                    continue;
                };
                let datapoints: Vec<Value> = loaded
                    .iter()
                    .filter(|dp| {
                        dp.get("url")
                            .and_then(Value::as_str)
                            .is_some_and(|url| url.starts_with(&prefix))
                    })
                    .cloned()
                    .collect();
                if let Value::Object(fields) = item {
                    fields.insert("content".to_string(), Value::Array(datapoints));
                }
            }
            continue;
        }

        let by_url: HashMap<&str, &Value> = loaded
            .iter()
            .filter_map(|obj| obj.get("url").and_then(Value::as_str).map(|url| (url, obj)))
            .collect();

        for item in items.iter_mut() {
            match item.get_mut(sideload.field()) {
                Some(Value::Array(entries)) => {
                    for entry in entries.iter_mut() {
                        replace_link(entry, &by_url);
                    }
                }
                Some(field) => replace_link(field, &by_url),
                None => {}
            }
        }
    }
}

fn replace_link(value: &mut Value, by_url: &HashMap<&str, &Value>) {
    let found = value
        .as_str()
        .and_then(|url| by_url.get(url))
        .map(|obj| (*obj).clone());
    if let Some(obj) = found {
        *value = obj;
    }
}

struct PageState {
    client: Client,
    first: RequestDescriptor,
    next: Option<RequestDescriptor>,
    sideloads: Vec<Sideload>,
    page: usize,
}

/// Stream every item behind `first`, page after page
///
/// Stops when the server announces no next page, when a page comes back empty,
/// or when a page is shorter than an explicitly requested `page_size`. An
/// error on any page ends the stream after yielding it.
pub fn paginate<T>(
    client: Client,
    first: RequestDescriptor,
    sideloads: Vec<Sideload>,
) -> BoxStream<'static, Result<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    let state = PageState {
        client,
        next: Some(first.clone()),
        first,
        sideloads,
        page: 0,
    };

    stream::try_unfold(state, |mut state| async move {
        let Some(request) = state.next.take() else {
            return Ok::<_, Error>(None);
        };

        let response = state.client.execute(&request).await?;
        let page: Page<T> = parse_page(&response.body, &state.sideloads)?;
        state.page += 1;

        let short = state
            .first
            .page_size()
            .is_some_and(|size| page.items.len() < size);
        if !page.items.is_empty() && !short {
            state.next = page.next.map(|cursor| match cursor {
                Cursor::Url(url) => request.follow(url),
                Cursor::Token(token) => state.first.with_cursor(token),
            });
        }

        debug!(
            page = state.page,
            items = page.items.len(),
            has_next = state.next.is_some(),
            "fetched page"
        );
        Ok::<_, Error>(Some((page.items, state)))
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, Error>)))
    .try_flatten()
    .boxed()
}
