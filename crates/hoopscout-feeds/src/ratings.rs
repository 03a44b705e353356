// Ratings provider: season-aggregate tables, daily predictions and
// historical snapshots, all as lists of raw rows.
//
// `KenPomClient` talks to the live API through the injected response cache.
// `CsvSnapshotProvider` (see snapshot.rs) serves the same tables from disk.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use futures_util::FutureExt;
use hoopscout_core::config::{CacheTtls, ProviderSettings};
use hoopscout_core::RawRow;
use serde_json::Value;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::error::{FeedError, FeedResult};

// ---------------------------------------------------------------------------
// Datasets and queries
// ---------------------------------------------------------------------------

/// Season-level tables published by the ratings provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Teams,
    Conferences,
    Ratings,
    FourFactors,
    MiscStats,
    PointDistribution,
    Height,
    ConferenceRatings,
}

impl Dataset {
    pub const ALL: [Dataset; 8] = [
        Dataset::Teams,
        Dataset::Conferences,
        Dataset::Ratings,
        Dataset::FourFactors,
        Dataset::MiscStats,
        Dataset::PointDistribution,
        Dataset::Height,
        Dataset::ConferenceRatings,
    ];

    /// Endpoint name on the provider's API (also the snapshot file stem).
    pub fn endpoint(&self) -> &'static str {
        match self {
            Dataset::Teams => "teams",
            Dataset::Conferences => "conferences",
            Dataset::Ratings => "ratings",
            Dataset::FourFactors => "four-factors",
            Dataset::MiscStats => "misc-stats",
            Dataset::PointDistribution => "pointdist",
            Dataset::Height => "height",
            Dataset::ConferenceRatings => "conf-ratings",
        }
    }

    pub fn ttl(&self, ttls: &CacheTtls) -> Duration {
        match self {
            Dataset::Ratings | Dataset::FourFactors | Dataset::MiscStats | Dataset::PointDistribution => {
                ttls.ratings()
            }
            Dataset::Teams | Dataset::Conferences | Dataset::Height => ttls.static_tables(),
            Dataset::ConferenceRatings => ttls.fanmatch(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Filters for a season table request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingsQuery {
    pub year: u16,
    pub team_id: Option<u32>,
    pub conference: Option<String>,
    /// Conference games only; honored for [`Dataset::FourFactors`].
    pub conf_only: bool,
}

impl RatingsQuery {
    pub fn season(year: u16) -> Self {
        RatingsQuery {
            year,
            team_id: None,
            conference: None,
            conf_only: false,
        }
    }

    pub fn team(mut self, team_id: u32) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn conference(mut self, conf: impl Into<String>) -> Self {
        self.conference = Some(conf.into());
        self
    }

    pub fn conf_only(mut self) -> Self {
        self.conf_only = true;
        self
    }

    /// Query-string parameters for `dataset`.
    pub fn params(&self, dataset: Dataset) -> Vec<(&'static str, String)> {
        let mut params = vec![("y", self.year.to_string())];
        if matches!(dataset, Dataset::Teams | Dataset::Conferences) {
            return params;
        }
        if let Some(id) = self.team_id {
            if dataset != Dataset::ConferenceRatings {
                params.push(("team_id", id.to_string()));
            }
        }
        if let Some(conf) = &self.conference {
            params.push(("c", conf.clone()));
        }
        if self.conf_only && dataset == Dataset::FourFactors {
            params.push(("conf_only", "true".to_string()));
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait RatingsProvider: Send + Sync {
    async fn table(&self, dataset: Dataset, query: &RatingsQuery) -> FeedResult<Vec<RawRow>>;

    /// Game predictions for one date.
    async fn fanmatch(&self, date: NaiveDate) -> FeedResult<Vec<RawRow>>;

    /// Ratings as they stood on `date`.
    async fn archive(&self, date: NaiveDate, team_id: Option<u32>) -> FeedResult<Vec<RawRow>>;

    fn clear_cache(&self);
}

/// Resolve a team name to the provider's `TeamID` by case-insensitive
/// substring match on `TeamName`.
pub async fn find_team_id(provider: &dyn RatingsProvider, name: &str, year: u16) -> FeedResult<u32> {
    let teams = provider.table(Dataset::Teams, &RatingsQuery::season(year)).await?;
    teams
        .iter()
        .find(|r| r.text_contains_ignore_case("TeamName", name))
        .map(|r| r.float("TeamID"))
        .filter(|id| *id >= 1.0)
        .map(|id| id as u32)
        .ok_or_else(|| FeedError::TeamNotFound(name.to_string()))
}

/// Interpret a provider body as rows. Null and empty arrays are no rows;
/// anything other than an array of objects is malformed.
pub fn parse_rows(source_name: &str, body: Value) -> FeedResult<Vec<RawRow>> {
    match body {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(RawRow::from(map)),
                other => Err(FeedError::malformed(
                    source_name,
                    format!("row {i} is {} not an object", json_kind(&other)),
                )),
            })
            .collect(),
        other => Err(FeedError::malformed(
            source_name,
            format!("expected an array of rows, got {}", json_kind(&other)),
        )),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ---------------------------------------------------------------------------
// KenPomClient
// ---------------------------------------------------------------------------

/// HTTP client for the ratings provider's JSON API.
pub struct KenPomClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    ttls: CacheTtls,
    cache: Arc<dyn ResponseCache>,
}

impl KenPomClient {
    /// Build a client. An empty API key is rejected up front.
    pub fn new(
        settings: &ProviderSettings,
        api_key: &str,
        ttls: CacheTtls,
        cache: Arc<dyn ResponseCache>,
    ) -> FeedResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(FeedError::MissingCredential("kenpom_api_key"));
        }
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|source| FeedError::Transport {
                url: settings.base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            ttls,
            cache,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/api.php", self.base_url)
    }

    async fn rows(
        &self,
        endpoint: &'static str,
        params: Vec<(&'static str, String)>,
        ttl: Duration,
    ) -> FeedResult<Vec<RawRow>> {
        let key = cache_key(endpoint, &params);
        let body = self
            .cache
            .get_or_fetch(&key, ttl, self.get_json(endpoint, params).boxed())
            .await?;
        parse_rows(endpoint, body)
    }

    async fn get_json(
        &self,
        endpoint: &'static str,
        mut params: Vec<(&'static str, String)>,
    ) -> FeedResult<Value> {
        let url = self.api_url();
        params.insert(0, ("endpoint", endpoint.to_string()));
        debug!(endpoint, ?params, "ratings request");

        let resp = self
            .http
            .get(&url)
            .query(&params)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|source| FeedError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FeedError::Auth);
        }
        if !status.is_success() {
            return Err(FeedError::Status {
                url,
                status: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| FeedError::malformed(endpoint, e.to_string()))
    }
}

fn cache_key(endpoint: &str, params: &[(&'static str, String)]) -> String {
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("ratings:{endpoint}?{}", query.join("&"))
}

#[async_trait]
impl RatingsProvider for KenPomClient {
    async fn table(&self, dataset: Dataset, query: &RatingsQuery) -> FeedResult<Vec<RawRow>> {
        self.rows(dataset.endpoint(), query.params(dataset), dataset.ttl(&self.ttls))
            .await
    }

    async fn fanmatch(&self, date: NaiveDate) -> FeedResult<Vec<RawRow>> {
        let params = vec![("d", date.format("%Y-%m-%d").to_string())];
        self.rows("fanmatch", params, self.ttls.fanmatch()).await
    }

    async fn archive(&self, date: NaiveDate, team_id: Option<u32>) -> FeedResult<Vec<RawRow>> {
        let mut params = vec![("d", date.format("%Y-%m-%d").to_string())];
        if let Some(id) = team_id {
            params.push(("team_id", id.to_string()));
        }
        self.rows("archive", params, self.ttls.static_tables()).await
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::NoCache;
    use serde_json::json;

    struct TeamsOnly(Vec<RawRow>);

    #[async_trait]
    impl RatingsProvider for TeamsOnly {
        async fn table(&self, dataset: Dataset, _query: &RatingsQuery) -> FeedResult<Vec<RawRow>> {
            assert_eq!(dataset, Dataset::Teams);
            Ok(self.0.clone())
        }
        async fn fanmatch(&self, _date: NaiveDate) -> FeedResult<Vec<RawRow>> {
            Ok(Vec::new())
        }
        async fn archive(&self, _date: NaiveDate, _team_id: Option<u32>) -> FeedResult<Vec<RawRow>> {
            Ok(Vec::new())
        }
        fn clear_cache(&self) {}
    }

    fn teams() -> TeamsOnly {
        TeamsOnly(
            parse_rows(
                "teams",
                json!([
                    {"TeamName": "St. John's", "TeamID": 232},
                    {"TeamName": "Saint Joseph's", "TeamID": "231"}
                ]),
            )
            .unwrap(),
        )
    }

    fn settings() -> ProviderSettings {
        ProviderSettings {
            base_url: "https://kenpom.com/".to_string(),
            timeout_secs: 30,
        }
    }

    #[tokio::test]
    async fn find_team_id_substring_match() {
        assert_eq!(find_team_id(&teams(), "john", 2026).await.unwrap(), 232);
        assert_eq!(find_team_id(&teams(), "SAINT JOSEPH", 2026).await.unwrap(), 231);
    }

    #[tokio::test]
    async fn find_team_id_unknown_team() {
        let err = find_team_id(&teams(), "Gonzaga", 2026).await.unwrap_err();
        assert!(matches!(err, FeedError::TeamNotFound(ref n) if n == "Gonzaga"));
    }

    #[test]
    fn parse_rows_accepts_array_and_null() {
        let rows = parse_rows("ratings", json!([{"TeamName": "Duke"}, {}])).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text("TeamName"), "Duke");
        assert!(parse_rows("ratings", Value::Null).unwrap().is_empty());
        assert!(parse_rows("ratings", json!([])).unwrap().is_empty());
    }

    #[test]
    fn parse_rows_rejects_other_shapes() {
        let err = parse_rows("ratings", json!({"error": "bad"})).unwrap_err();
        assert!(err.to_string().contains("expected an array"));
        let err = parse_rows("ratings", json!([{"a": 1}, 5])).unwrap_err();
        assert!(matches!(err, FeedError::Malformed { .. }));
    }

    #[test]
    fn query_params_per_dataset() {
        let q = RatingsQuery::season(2026).team(232).conference("BE").conf_only();
        assert_eq!(
            q.params(Dataset::FourFactors),
            vec![
                ("y", "2026".to_string()),
                ("team_id", "232".to_string()),
                ("c", "BE".to_string()),
                ("conf_only", "true".to_string()),
            ]
        );
        assert_eq!(
            q.params(Dataset::Ratings),
            vec![("y", "2026".to_string()), ("team_id", "232".to_string()), ("c", "BE".to_string())]
        );
        assert_eq!(q.params(Dataset::Teams), vec![("y", "2026".to_string())]);
        assert_eq!(
            q.params(Dataset::ConferenceRatings),
            vec![("y", "2026".to_string()), ("c", "BE".to_string())]
        );
    }

    #[test]
    fn dataset_ttls_follow_config() {
        let ttls = CacheTtls::default();
        assert_eq!(Dataset::Ratings.ttl(&ttls), Duration::from_secs(1800));
        assert_eq!(Dataset::PointDistribution.ttl(&ttls), Duration::from_secs(1800));
        assert_eq!(Dataset::Height.ttl(&ttls), Duration::from_secs(86400));
        assert_eq!(Dataset::ConferenceRatings.ttl(&ttls), Duration::from_secs(3600));
    }

    #[test]
    fn empty_api_key_rejected() {
        let err = KenPomClient::new(&settings(), "  ", CacheTtls::default(), Arc::new(NoCache))
            .err()
            .unwrap();
        assert!(matches!(err, FeedError::MissingCredential(_)));
    }

    #[test]
    fn client_trims_base_url() {
        let client =
            KenPomClient::new(&settings(), "secret", CacheTtls::default(), Arc::new(NoCache)).unwrap();
        assert_eq!(client.api_url(), "https://kenpom.com/api.php");
    }

    #[test]
    fn cache_keys_include_params() {
        let a = cache_key("ratings", &[("y", "2026".into())]);
        let b = cache_key("ratings", &[("y", "2025".into())]);
        assert_ne!(a, b);
        assert_eq!(a, "ratings:ratings?y=2026");
    }
}
