use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::fetch::{HttpClient, fetch_bytes};
use crate::records::RawTable;
use crate::services::ridership_source::{RidershipSource, SourceKind};

/// Outcome of one page request.
#[derive(Debug, PartialEq)]
enum Page {
    Rows {
        rows: Vec<Map<String, Value>>,
        total: usize,
    },
    /// `{"RESULT": {"MESSAGE": ...}}`: an error or "no data" notice.
    Notice { message: String },
}

/// Pages through `{base}/{key}/json/{dataset}/{start}/{end}/{period}`.
pub struct OpenApiClient<C> {
    http: C,
    base_url: String,
    api_key: String,
    dataset: String,
    period: String,
    page_size: usize,
    delay: Duration,
}

impl<C: HttpClient> OpenApiClient<C> {
    pub fn new(
        http: C,
        api_key: impl Into<String>,
        period: impl Into<String>,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            dataset: config.dataset.clone(),
            period: period.into(),
            page_size: config.page_size.max(1),
            delay: config.request_delay(),
        }
    }

    fn page_url(&self, start: usize, end: usize) -> String {
        format!(
            "{}/{}/json/{}/{}/{}/{}",
            self.base_url, self.api_key, self.dataset, start, end, self.period
        )
    }

    /// Collects every page. A failure after the first page keeps what was
    /// already collected; a failure before any row arrives is fatal.
    #[tracing::instrument(skip(self), fields(dataset = %self.dataset, period = %self.period))]
    pub fn fetch_all(&self) -> AnalysisResult<RawTable> {
        let mut rows: Vec<Map<String, Value>> = Vec::new();
        let mut start = 1;
        let mut end = self.page_size;

        loop {
            // The URL embeds the API key, so only the cursor is logged.
            debug!(start, end, "Requesting page");

            let page = match self.fetch_page(start, end) {
                Ok(page) => page,
                Err(message) if rows.is_empty() => {
                    return Err(AnalysisError::source_unavailable(message));
                }
                Err(message) => {
                    warn!(
                        collected = rows.len(),
                        error = %message,
                        "Pagination aborted, returning partial rows"
                    );
                    break;
                }
            };

            match page {
                Page::Rows { rows: batch, total } => {
                    if batch.is_empty() {
                        break;
                    }
                    info!(batch = batch.len(), total, start, end, "Page received");
                    rows.extend(batch);

                    if end >= total {
                        break;
                    }
                    start = end + 1;
                    end = (end + self.page_size).min(total);
                }
                Page::Notice { message } => {
                    info!(message = %message, "Source reported no further data");
                    break;
                }
            }

            std::thread::sleep(self.delay);
        }

        if rows.is_empty() {
            return Err(AnalysisError::source_unavailable(format!(
                "no rows returned for {}/{}",
                self.dataset, self.period
            )));
        }

        info!(rows = rows.len(), "Remote fetch complete");
        Ok(rows_to_table(rows))
    }

    fn fetch_page(&self, start: usize, end: usize) -> Result<Page, String> {
        let bytes = fetch_bytes(&self.http, &self.page_url(start, end))
            .map_err(|e| format!("page {start}-{end}: {e}"))?;
        let json: Value = serde_json::from_slice(&bytes)
            .map_err(|e| format!("page {start}-{end}: invalid JSON: {e}"))?;
        parse_page(&json, &self.dataset)
            .ok_or_else(|| format!("page {start}-{end}: unrecognised payload"))
    }
}

impl<C: HttpClient> RidershipSource for OpenApiClient<C> {
    fn kind(&self) -> SourceKind {
        SourceKind::OpenApi {
            dataset: self.dataset.clone(),
            period: self.period.clone(),
        }
    }

    fn load(&self) -> AnalysisResult<RawTable> {
        self.fetch_all()
    }
}

fn parse_page(json: &Value, dataset: &str) -> Option<Page> {
    if let Some(rows) = json[dataset]["row"].as_array() {
        let total = json[dataset]["list_total_count"].as_u64().unwrap_or(0) as usize;
        let rows = rows.iter().filter_map(|r| r.as_object().cloned()).collect();
        return Some(Page::Rows { rows, total });
    }

    json.get("RESULT").map(|result| Page::Notice {
        message: result["MESSAGE"].as_str().unwrap_or("").to_string(),
    })
}

/// Flattens JSON objects into a table; columns appear in first-seen order.
fn rows_to_table(rows: Vec<Map<String, Value>>) -> RawTable {
    let mut columns: Vec<String> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = RawTable::new(columns);
    for row in rows {
        let values = table
            .columns
            .iter()
            .map(|c| match row.get(c) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        table.push_row(values);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpResponse;
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses in order and records requested URLs.
    struct ScriptedClient {
        responses: RefCell<VecDeque<anyhow::Result<HttpResponse>>>,
        requested: RefCell<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<anyhow::Result<HttpResponse>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                requested: RefCell::new(Vec::new()),
            }
        }
    }

    impl HttpClient for &ScriptedClient {
        fn get(&self, url: &str) -> anyhow::Result<HttpResponse> {
            self.requested.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(anyhow::anyhow!("no scripted response left")))
        }
    }

    fn ok(body: Value) -> anyhow::Result<HttpResponse> {
        Ok(HttpResponse {
            status: 200,
            body: serde_json::to_vec(&body).unwrap(),
        })
    }

    fn rows_page(stations: &[&str], total: usize) -> anyhow::Result<HttpResponse> {
        let rows: Vec<Value> = stations
            .iter()
            .map(|s| json!({ "SBWY_ROUT_LN_NM": "2호선", "STTN": s, "HR_8_GET_ON_NOPE": 10 }))
            .collect();
        ok(json!({ "CardSubwayTime": { "list_total_count": total, "row": rows } }))
    }

    fn config(page_size: usize) -> AnalysisConfig {
        AnalysisConfig {
            api_base_url: "http://example.test/".to_string(),
            page_size,
            request_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_pages_until_total_reached() {
        let http = ScriptedClient::new(vec![
            rows_page(&["A", "B"], 5),
            rows_page(&["C", "D"], 5),
            rows_page(&["E"], 5),
        ]);
        let client = OpenApiClient::new(&http, "KEY", "202309", &config(2));

        let table = client.fetch_all().unwrap();

        assert_eq!(table.len(), 5);
        assert_eq!(
            *http.requested.borrow(),
            vec![
                "http://example.test/KEY/json/CardSubwayTime/1/2/202309",
                "http://example.test/KEY/json/CardSubwayTime/3/4/202309",
                "http://example.test/KEY/json/CardSubwayTime/5/5/202309",
            ]
        );
    }

    #[test]
    fn test_stops_on_result_notice() {
        let http = ScriptedClient::new(vec![
            rows_page(&["A", "B"], 10),
            ok(json!({ "RESULT": { "CODE": "INFO-200", "MESSAGE": "해당하는 데이터가 없습니다." } })),
        ]);
        let client = OpenApiClient::new(&http, "KEY", "202309", &config(2));

        let table = client.fetch_all().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(http.requested.borrow().len(), 2);
    }

    #[test]
    fn test_first_page_failure_is_source_unavailable() {
        let http = ScriptedClient::new(vec![Ok(HttpResponse {
            status: 500,
            body: Vec::new(),
        })]);
        let client = OpenApiClient::new(&http, "KEY", "202309", &config(2));

        let err = client.fetch_all().unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_mid_pagination_failure_keeps_partial_rows() {
        let http = ScriptedClient::new(vec![
            rows_page(&["A", "B"], 6),
            Err(anyhow::anyhow!("connection reset")),
        ]);
        let client = OpenApiClient::new(&http, "KEY", "202309", &config(2));

        let table = client.fetch_all().unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_notice_without_rows_is_source_unavailable() {
        let http = ScriptedClient::new(vec![ok(json!({ "RESULT": { "MESSAGE": "인증키가 유효하지 않습니다." } }))]);
        let client = OpenApiClient::new(&http, "KEY", "202309", &config(2));

        let err = client.fetch_all().unwrap_err();
        assert!(matches!(err, AnalysisError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_rows_to_table_stringifies_values() {
        let row = json!({ "STTN": "강남", "HR_8_GET_ON_NOPE": 1234, "USE_MM": null });
        let table = rows_to_table(vec![row.as_object().unwrap().clone()]);

        let get = |name: &str| table.rows[0].get(table.column_index(name).unwrap()).unwrap();
        assert_eq!(get("STTN"), "강남");
        assert_eq!(get("HR_8_GET_ON_NOPE"), "1234");
        assert_eq!(get("USE_MM"), "");
    }
}
