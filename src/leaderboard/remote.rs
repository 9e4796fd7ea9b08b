//! Hosted leaderboard over a PostgREST-style HTTP API
//!
//! Table `leaderboard(name text, score int, created_at timestamptz)`.

use serde::{Deserialize, Serialize};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use super::{LeaderboardEntry, LeaderboardStore, TimeFilter, now_ms};
use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct Row {
    name: String,
    score: u32,
    created_at: String,
}

impl From<Row> for LeaderboardEntry {
    fn from(row: Row) -> Self {
        let submitted_at = js_sys::Date::parse(&row.created_at);
        LeaderboardEntry {
            name: row.name,
            score: row.score,
            submitted_at: if submitted_at.is_nan() { 0.0 } else { submitted_at },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScoreRow {
    score: u32,
}

#[derive(Serialize)]
struct NewRow<'a> {
    name: &'a str,
    score: u32,
}

pub struct RestLeaderboard {
    base_url: String,
    api_key: String,
}

fn js_err(err: JsValue) -> StoreError {
    StoreError::Unavailable(format!("{:?}", err))
}

impl RestLeaderboard {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, query: &str) -> String {
        format!("{}/rest/v1/leaderboard?{}", self.base_url, query)
    }

    fn headers(&self) -> Result<Headers, StoreError> {
        let headers = Headers::new().map_err(js_err)?;
        headers.set("apikey", &self.api_key).map_err(js_err)?;
        headers
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .map_err(js_err)?;
        headers.set("Content-Type", "application/json").map_err(js_err)?;
        Ok(headers)
    }

    async fn send(&self, method: &str, url: &str, body: Option<String>) -> Result<String, StoreError> {
        let window = web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;

        let headers = self.headers()?;
        if body.is_some() {
            headers.set("Prefer", "return=representation").map_err(js_err)?;
        }

        let init = RequestInit::new();
        init.set_method(method);
        init.set_mode(RequestMode::Cors);
        init.set_headers(&headers);
        if let Some(body) = body {
            init.set_body(&JsValue::from_str(&body));
        }

        let request = Request::new_with_str_and_init(url, &init).map_err(js_err)?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(js_err)?;
        let resp: Response = resp_value.dyn_into().map_err(js_err)?;
        if !resp.ok() {
            return Err(StoreError::Http(resp.status()));
        }

        let text = JsFuture::from(resp.text().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        text.as_string()
            .ok_or_else(|| StoreError::Decode("response body is not text".into()))
    }
}

impl LeaderboardStore for RestLeaderboard {
    async fn submit(&self, name: &str, score: u32) -> Result<LeaderboardEntry, StoreError> {
        let body = serde_json::to_string(&NewRow { name, score })?;
        let text = self.send("POST", &self.table_url("select=*"), Some(body)).await?;
        let mut rows: Vec<Row> = serde_json::from_str(&text)?;
        let row = rows
            .pop()
            .ok_or_else(|| StoreError::Decode("insert returned no row".into()))?;
        log::info!("Score {} for {} submitted", row.score, row.name);
        Ok(row.into())
    }

    async fn fetch_top(
        &self,
        k: usize,
        filter: TimeFilter,
    ) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut query = format!(
            "select=name,score,created_at&order=score.desc,created_at.asc&limit={}",
            k
        );
        if let Some(cutoff) = filter.cutoff(now_ms()) {
            let iso: String = js_sys::Date::new(&JsValue::from_f64(cutoff))
                .to_iso_string()
                .into();
            query.push_str(&format!("&created_at=gte.{}", iso));
        }

        let text = self.send("GET", &self.table_url(&query), None).await?;
        let rows: Vec<Row> = serde_json::from_str(&text)?;
        log::info!("Leaderboard fetched ({} entries, {})", rows.len(), filter.as_str());
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }

    async fn fetch_global_best(&self) -> Result<u32, StoreError> {
        let url = self.table_url("select=score&order=score.desc&limit=1");
        let text = self.send("GET", &url, None).await?;
        let rows: Vec<ScoreRow> = serde_json::from_str(&text)?;
        Ok(rows.first().map(|r| r.score).unwrap_or(0))
    }
}
