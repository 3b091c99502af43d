//! HTTP surface of the dashboard: the page, its JSON feed and the CSV download.

use std::net::SocketAddr;
use std::sync::Arc;

use analytics::export::{EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME};
use analytics::{
    build_view, to_csv, DashboardView, DatasetCache, DateRange, Frequency, MeasurementTable,
};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use common::config::DashboardConfig;
use common::{Error, Pollutant};
use openweather_client::OpenWeatherClient;
use serde::Deserialize;
use tracing::{error, info, warn};

const INDEX_HTML: &str = include_str!("../static/index.html");
const STYLE_CSS: &str = include_str!("../static/style.css");

const DEFAULT_POLLUTANT: Pollutant = Pollutant::Pm25;
const DEFAULT_FREQUENCY: Frequency = Frequency::Daily;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<DashboardConfig>,
    pub client: OpenWeatherClient,
    pub cache: Arc<DatasetCache>,
}

impl AppState {
    /// The cached dataset, refetched from OpenWeather once the cache expires.
    pub async fn dataset(&self) -> Result<Arc<MeasurementTable>, Error> {
        let client = self.client.clone();
        let cfg = self.cfg.clone();
        self.cache
            .get_or_refresh(|| async move {
                let records = client.get_dataset(&cfg.location, Utc::now()).await?;
                Ok::<_, Error>(MeasurementTable::from_records(records))
            })
            .await
    }
}

/// Maps dashboard errors onto HTTP statuses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            Error::InvalidRange(_) | Error::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Error::Http(_) | Error::OpenWeather(_) | Error::Json(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Rejected request: {}", self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub pollutant: Option<String>,
    pub freq: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DashboardQuery {
    fn pollutant(&self) -> Result<Pollutant, Error> {
        match self.pollutant.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw.parse(),
            None => Ok(DEFAULT_POLLUTANT),
        }
    }

    fn frequency(&self) -> Result<Frequency, Error> {
        match self.freq.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => raw.parse(),
            None => Ok(DEFAULT_FREQUENCY),
        }
    }

    fn range(&self, table: &MeasurementTable) -> Result<DateRange, Error> {
        DateRange::resolve(self.start.as_deref(), self.end.as_deref(), table)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/style.css", get(style))
        .route("/healthz", get(healthz))
        .route("/api/dashboard", get(dashboard))
        .route("/api/export.csv", get(export_csv))
        .with_state(state)
}

pub async fn serve(state: AppState, bind: SocketAddr) -> Result<(), Error> {
    let app = router(state);
    info!("Dashboard listening on http://{}", bind);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], STYLE_CSS)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn dashboard(
    State(st): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> ApiResult<Json<DashboardView>> {
    let pollutant = q.pollutant()?;
    let frequency = q.frequency()?;
    let table = st.dataset().await?;
    let range = q.range(&table)?;

    Ok(Json(build_view(
        &table,
        &st.cfg.location.name,
        range,
        pollutant,
        frequency,
    )))
}

async fn export_csv(
    State(st): State<AppState>,
    Query(q): Query<DashboardQuery>,
) -> ApiResult<Response> {
    let table = st.dataset().await?;
    let range = q.range(&table)?;
    let filtered = table.filter_dates(range);
    let body = to_csv(&filtered)?;
    info!(
        "Exporting {} rows for {}..{}",
        filtered.len(),
        range.start,
        range.end
    );

    Ok((
        [
            (header::CONTENT_TYPE, EXPORT_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::MeasurementRecord;
    use std::time::Duration;

    fn record(hour: u32, day: u32, pm2_5: f64) -> MeasurementRecord {
        MeasurementRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap(),
            aqi: 3,
            co: 300.0,
            no: 0.5,
            no2: 12.0,
            o3: 40.0,
            so2: 8.0,
            pm2_5,
            pm10: 30.0,
            nh3: 4.0,
        }
    }

    async fn state_with_rows(records: Vec<MeasurementRecord>) -> AppState {
        let mut cfg = DashboardConfig::default();
        // Unroutable, so an unexpected refetch fails fast instead of hitting the network.
        cfg.base_url = "http://127.0.0.1:9".into();
        let state = AppState {
            client: OpenWeatherClient::new("test-key".into(), &cfg.base_url).unwrap(),
            cfg: Arc::new(cfg),
            cache: Arc::new(DatasetCache::new(Duration::from_secs(3600))),
        };
        state
            .cache
            .get_or_refresh(|| async move { Ok(MeasurementTable::from_records(records)) })
            .await
            .unwrap();
        state
    }

    fn query(pairs: &[(&str, &str)]) -> DashboardQuery {
        let get = |k: &str| {
            pairs
                .iter()
                .find(|(name, _)| *name == k)
                .map(|(_, v)| v.to_string())
        };
        DashboardQuery {
            pollutant: get("pollutant"),
            freq: get("freq"),
            start: get("start"),
            end: get("end"),
        }
    }

    #[test]
    fn test_query_defaults() {
        let q = DashboardQuery::default();
        assert_eq!(q.pollutant().unwrap(), Pollutant::Pm25);
        assert_eq!(q.frequency().unwrap(), Frequency::Daily);

        let q = query(&[("pollutant", "no2"), ("freq", "monthly")]);
        assert_eq!(q.pollutant().unwrap(), Pollutant::No2);
        assert_eq!(q.frequency().unwrap(), Frequency::Monthly);
    }

    #[test]
    fn test_error_statuses() {
        let bad = ApiError::from(Error::InvalidQuery("x".into()));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let upstream = ApiError::from(Error::OpenWeather("503".into()));
        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        let other = ApiError::from(Error::Other("boom".into()));
        assert_eq!(other.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_dashboard_renders_selected_range() {
        let state = state_with_rows(vec![
            record(1, 4, 20.0),
            record(2, 4, 30.0),
            record(1, 5, 60.0),
        ])
        .await;

        let Json(view) = dashboard(
            State(state),
            Query(query(&[("freq", "hourly"), ("start", "2024-03-04"), ("end", "2024-03-04")])),
        )
        .await
        .map_err(|e| e.0)
        .unwrap();

        assert_eq!(view.title, "Jakarta Air Quality Dashboard");
        let summary = view.summary.unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.pollutants[0].delta, Some(10.0));
        assert_eq!(view.line_chart.series.points.len(), 2);
    }

    #[tokio::test]
    async fn test_dashboard_rejects_unknown_pollutant() {
        let state = state_with_rows(vec![record(1, 4, 20.0)]).await;

        let err = dashboard(State(state), Query(query(&[("pollutant", "radon")])))
            .await
            .err()
            .unwrap();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_export_sets_download_headers() {
        let state = state_with_rows(vec![record(1, 4, 20.0), record(1, 5, 60.0)]).await;

        let resp = export_csv(State(state), Query(query(&[("start", "2024-03-05")])))
            .await
            .map_err(|e| e.0)
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"file.csv\""
        );
    }
}
