/// Synchronous client for the **World Bank API (v2)**.
///
/// Every metadata endpoint (`country`, `sources/{db}/concepts`, `topic/{id}/indicator`, ...)
/// is paged the same way, so the client exposes a single [`Fetch::fetch_all`] that
/// follows pages and returns the element records as raw JSON.
///
/// ### Notes
/// - The API answers in two shapes: the classic `[header, [rows...]]` list and the
///   newer `{ ..header, "source": ... }` object. Both are sniffed here.
/// - The API sometimes serializes `per_page`/`total` as **strings**; we accept both.
/// - Transient failures (5xx / network) are retried with a short backoff. Callers
///   above this layer never retry.
///
/// Typical usage:
/// ```no_run
/// # use wbgapi_rs::api::{Client, Fetch};
/// let client = Client::default();
/// let rows = client.fetch_all("country", &[], "en", false)?;
/// # Ok::<(), wbgapi_rs::Error>(())
/// ```
use crate::error::{Error, Result};
use crate::models::Meta;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

/// Source of paged API records.
///
/// `Session` only talks to the API through this trait, so tests and offline
/// callers can plug in canned records.
pub trait Fetch {
    /// Retrieve every record of `path` across all pages.
    ///
    /// - `params`: extra query parameters (`per_page`, `page` and `format` are supplied).
    /// - `lang`: language segment of the URL (`en`, `fr`, ...).
    /// - `concepts`: for `sources/...` endpoints, return the concept list instead of the
    ///   first concept's variables.
    fn fetch_all(
        &self,
        path: &str,
        params: &[(&str, String)],
        lang: &str,
        concepts: bool,
    ) -> Result<Vec<Value>>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch_all(
        &self,
        path: &str,
        params: &[(&str, String)],
        lang: &str,
        concepts: bool,
    ) -> Result<Vec<Value>> {
        (**self).fetch_all(path, params, lang, concepts)
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    pub per_page: u32,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("wbgapi_rs/", env!("CARGO_PKG_VERSION"))) // set user agent
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://api.worldbank.org/v2".into(),
            per_page: 1000,
            http,
        }
    }
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Percent-encode identifiers and join them the way the API expects (`DEU;USA`).
pub fn query_param<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(|s| percent_encoding::utf8_percent_encode(s.trim(), SAFE).to_string())
        .collect::<Vec<_>>()
        .join(";")
}

/// Return the paging header of a response.
pub fn response_header(url: &str, result: &Value) -> Result<Meta> {
    let hdr = match result {
        // classic v2 API
        Value::Array(arr) if arr.first().is_some_and(Value::is_object) => &arr[0],
        // beta "advanced" API
        Value::Object(_) => result,
        _ => return Err(unrecognized(url)),
    };

    if let Some(msg) = hdr.get("message") {
        let first = msg.get(0).unwrap_or(msg);
        let text = |k: &str| first.get(k).and_then(Value::as_str).unwrap_or_default().to_string();
        return Err(Error::Api {
            url: url.to_string(),
            message: format!("{}: {}", text("key"), text("value")),
            status: None,
        });
    }

    serde_json::from_value(hdr.clone()).map_err(|e| Error::Response {
        url: url.to_string(),
        message: format!("parse header: {e}"),
    })
}

/// Return the element records of a response.
pub fn response_objects(url: &str, result: &Value, want_concepts: bool) -> Result<Vec<Value>> {
    if let Value::Array(arr) = result {
        return match arr.get(1) {
            Some(Value::Array(rows)) => Ok(rows.clone()),
            Some(Value::Null) | None => Ok(vec![]),
            Some(_) => Err(unrecognized(url)),
        };
    }

    match result.get("source") {
        // metadata and concept lists
        Some(Value::Array(src)) if src.first().is_some_and(Value::is_object) => {
            let concepts = src[0].get("concept").and_then(Value::as_array);
            if want_concepts {
                return concepts.cloned().ok_or_else(|| unrecognized(url));
            }
            concepts
                .and_then(|c| c.first())
                .and_then(|c| c.get("variable"))
                .and_then(Value::as_array)
                .cloned()
                .ok_or_else(|| unrecognized(url))
        }
        // data from the beta endpoints
        Some(src @ Value::Object(_)) => src
            .get("data")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| unrecognized(url)),
        _ => Err(unrecognized(url)),
    }
}

fn unrecognized(url: &str) -> Error {
    Error::Response {
        url: url.to_string(),
        message: "Unrecognized response object format".into(),
    }
}

impl Client {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Build the URL of one page.
    pub fn page_url(&self, path: &str, params: &[(&str, String)], lang: &str, page: u32) -> String {
        let mut url = format!(
            "{}/{}/{}?per_page={}",
            self.base_url,
            lang,
            path.trim_start_matches('/'),
            self.per_page
        );
        for (k, v) in params {
            url.push_str(&format!("&{}={}", k, query_param([v.as_str()])));
        }
        url.push_str(&format!("&page={}&format=json", page));
        url
    }

    // Small retry for transient failures (5xx / network errors)
    fn get_json(&self, url: &str) -> Result<Value> {
        let mut last_err: Option<reqwest::Error> = None;
        for backoff_ms in [100u64, 300, 700] {
            match self.http.get(url).send() {
                Ok(r) if r.status().is_success() => {
                    return r.json().map_err(|_| Error::Response {
                        url: url.to_string(),
                        message: "JSON decoding error".into(),
                    });
                }
                Ok(r) if r.status().is_server_error() => {
                    log::debug!("GET {} returned {}, retrying", url, r.status());
                }
                Ok(r) => {
                    return Err(Error::Api {
                        url: url.to_string(),
                        message: r.status().canonical_reason().unwrap_or("HTTP error").into(),
                        status: Some(r.status().as_u16()),
                    });
                }
                Err(e) => last_err = Some(e),
            }
            std::thread::sleep(Duration::from_millis(backoff_ms));
        }
        match last_err {
            Some(source) => Err(Error::Transport {
                url: url.to_string(),
                source,
            }),
            None => Err(Error::Api {
                url: url.to_string(),
                message: "server error persisted after retries".into(),
                status: None,
            }),
        }
    }
}

impl Fetch for Client {
    fn fetch_all(
        &self,
        path: &str,
        params: &[(&str, String)],
        lang: &str,
        concepts: bool,
    ) -> Result<Vec<Value>> {
        // Safety cap to avoid pathological jobs
        let max_pages = 1000u32;

        let mut page = 1u32;
        let mut total: Option<u32> = None;
        let mut read = 0u32;
        let mut out = Vec::new();
        while total.is_none_or(|t| read < t) {
            let url = self.page_url(path, params, lang, page);
            if page > max_pages {
                return Err(Error::Response {
                    url,
                    message: format!("page limit exceeded ({})", max_pages),
                });
            }
            let v = self.get_json(&url)?;
            let hdr = response_header(&url, &v)?;
            total.get_or_insert(hdr.total);

            out.extend(response_objects(&url, &v, concepts)?);

            // per_page of 0 would never advance
            read += hdr.per_page.max(1);
            page += 1;
        }
        log::debug!("fetched {} records from {}", out.len(), path);
        Ok(out)
    }
}
