//! Factor catalog operations.
//!
//! Thin wrappers over the `/api/v1/factors` endpoints. Catalog records are
//! returned as raw JSON; the data, exposure and return endpoints can be asked
//! for a [`DataFrame`] instead.

use std::fmt;
use std::io::Cursor;

use chrono::NaiveDate;
use kkdata_core::{KkDataError, Notation, OrderBookIds, Result, codec};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::client::KkDataClient;

/// Default industry classification standard.
pub const DEFAULT_INDUSTRY_MAPPING: &str = "sws_2021";

/// Default universe for factor returns.
pub const DEFAULT_UNIVERSE: &str = "whole_market";

/// Date format for query parameters.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Factor category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorCategory {
    /// Price and volume derived factors.
    Technical,
    /// Financial statement derived factors.
    Fundamental,
    /// Alternative data factors.
    Alternative,
}

impl FactorCategory {
    /// Wire name of this category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Fundamental => "fundamental",
            Self::Alternative => "alternative",
        }
    }
}

impl fmt::Display for FactorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factor return estimation method.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorReturnMethod {
    /// Returns implied by cross-sectional regression.
    #[default]
    Implicit,
    /// Returns of explicit factor-mimicking portfolios.
    Explicit,
}

impl FactorReturnMethod {
    /// Wire name of this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Implicit => "implicit",
            Self::Explicit => "explicit",
        }
    }
}

/// A factor definition to create in the catalog.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewFactor {
    /// Factor name.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Factor category.
    pub category: FactorCategory,
    /// Factor computation code.
    pub code: String,
    /// Additional metadata.
    pub metadata: Option<Value>,
    /// Whether the factor is visible to other users.
    pub is_public: bool,
}

impl NewFactor {
    /// Creates a private factor definition without metadata.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: FactorCategory,
        code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            code: code.into(),
            metadata: None,
            is_public: false,
        }
    }

    /// Sets the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Marks the factor as public.
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.is_public = true;
        self
    }
}

/// Response of the factor data endpoints.
#[derive(Debug, Clone)]
pub enum FactorResponse {
    /// The `data` field as a table.
    Table(DataFrame),
    /// The raw JSON document.
    Json(Value),
}

impl FactorResponse {
    /// Returns the table, or an error if the response is raw JSON.
    pub fn into_table(self) -> Result<DataFrame> {
        match self {
            Self::Table(df) => Ok(df),
            Self::Json(_) => Err(KkDataError::InvalidParameter(
                "response was requested as JSON".to_string(),
            )),
        }
    }

    /// Returns the raw JSON, or `None` if the response is a table.
    #[must_use]
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Table(_) => None,
            Self::Json(value) => Some(value),
        }
    }
}

/// Parameters for `GET /api/v1/factors/data`.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorDataRequest {
    /// Securities, in any notation.
    pub order_book_ids: OrderBookIds,
    /// Factor names; `None` means all factors.
    pub factors: Option<Vec<String>>,
    /// Start date, inclusive.
    pub start_date: Option<NaiveDate>,
    /// End date, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Universe filter, e.g. `000300.XSHG` for CSI 300.
    pub universe: Option<String>,
    /// Return a table instead of raw JSON.
    pub expect_table: bool,
}

impl FactorDataRequest {
    /// Request all factors for the given securities.
    #[must_use]
    pub fn new(order_book_ids: impl Into<OrderBookIds>) -> Self {
        Self {
            order_book_ids: order_book_ids.into(),
            factors: None,
            start_date: None,
            end_date: None,
            universe: None,
            expect_table: true,
        }
    }

    /// Restrict to the named factors.
    #[must_use]
    pub fn with_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factors = Some(factors.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict to a date range.
    #[must_use]
    pub const fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Restrict to a universe.
    #[must_use]
    pub fn with_universe(mut self, universe: impl Into<String>) -> Self {
        self.universe = Some(universe.into());
        self
    }

    /// Return the raw JSON document instead of a table.
    #[must_use]
    pub const fn as_json(mut self) -> Self {
        self.expect_table = false;
        self
    }

    fn query_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let mut pairs = Vec::new();
        push_ids(&mut pairs, &self.order_book_ids)?;
        push_factors(&mut pairs, self.factors.as_deref());
        push_date(&mut pairs, "start_date", self.start_date);
        push_date(&mut pairs, "end_date", self.end_date);
        if let Some(universe) = &self.universe {
            pairs.push(("universe", universe.clone()));
        }
        Ok(pairs)
    }
}

/// Parameters for `GET /api/v1/factors/exposure`.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorExposureRequest {
    /// Securities, in any notation.
    pub order_book_ids: OrderBookIds,
    /// Start date, inclusive.
    pub start_date: NaiveDate,
    /// End date, inclusive.
    pub end_date: NaiveDate,
    /// Factor names; `None` means all factors.
    pub factors: Option<Vec<String>>,
    /// Industry classification standard.
    pub industry_mapping: String,
    /// Return a table instead of raw JSON.
    pub expect_table: bool,
}

impl FactorExposureRequest {
    /// Request exposures of the given securities over a date range.
    #[must_use]
    pub fn new(order_book_ids: impl Into<OrderBookIds>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            order_book_ids: order_book_ids.into(),
            start_date: start,
            end_date: end,
            factors: None,
            industry_mapping: DEFAULT_INDUSTRY_MAPPING.to_string(),
            expect_table: true,
        }
    }

    /// Restrict to the named factors.
    #[must_use]
    pub fn with_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factors = Some(factors.into_iter().map(Into::into).collect());
        self
    }

    /// Use a different industry classification.
    #[must_use]
    pub fn with_industry_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.industry_mapping = mapping.into();
        self
    }

    /// Return the raw JSON document instead of a table.
    #[must_use]
    pub const fn as_json(mut self) -> Self {
        self.expect_table = false;
        self
    }

    fn query_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        let mut pairs = Vec::new();
        push_ids(&mut pairs, &self.order_book_ids)?;
        push_date(&mut pairs, "start_date", Some(self.start_date));
        push_date(&mut pairs, "end_date", Some(self.end_date));
        push_factors(&mut pairs, self.factors.as_deref());
        pairs.push(("industry_mapping", self.industry_mapping.clone()));
        Ok(pairs)
    }
}

/// Parameters for `GET /api/v1/factors/return`.
#[derive(Clone, Debug, PartialEq)]
pub struct FactorReturnRequest {
    /// Start date, inclusive.
    pub start_date: NaiveDate,
    /// End date, inclusive.
    pub end_date: NaiveDate,
    /// Factor names; `None` means all factors.
    pub factors: Option<Vec<String>>,
    /// Universe, `whole_market` or an index code.
    pub universe: String,
    /// Estimation method.
    pub method: FactorReturnMethod,
    /// Industry classification standard.
    pub industry_mapping: String,
    /// Return a table instead of raw JSON.
    pub expect_table: bool,
}

impl FactorReturnRequest {
    /// Request factor returns over a date range with default settings.
    #[must_use]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start_date: start,
            end_date: end,
            factors: None,
            universe: DEFAULT_UNIVERSE.to_string(),
            method: FactorReturnMethod::default(),
            industry_mapping: DEFAULT_INDUSTRY_MAPPING.to_string(),
            expect_table: true,
        }
    }

    /// Restrict to the named factors.
    #[must_use]
    pub fn with_factors<I, S>(mut self, factors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.factors = Some(factors.into_iter().map(Into::into).collect());
        self
    }

    /// Use a different universe.
    #[must_use]
    pub fn with_universe(mut self, universe: impl Into<String>) -> Self {
        self.universe = universe.into();
        self
    }

    /// Use a different estimation method.
    #[must_use]
    pub const fn with_method(mut self, method: FactorReturnMethod) -> Self {
        self.method = method;
        self
    }

    /// Use a different industry classification.
    #[must_use]
    pub fn with_industry_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.industry_mapping = mapping.into();
        self
    }

    /// Return the raw JSON document instead of a table.
    #[must_use]
    pub const fn as_json(mut self) -> Self {
        self.expect_table = false;
        self
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_date(&mut pairs, "start_date", Some(self.start_date));
        push_date(&mut pairs, "end_date", Some(self.end_date));
        push_factors(&mut pairs, self.factors.as_deref());
        pairs.push(("universe", self.universe.clone()));
        pairs.push(("method", self.method.as_str().to_string()));
        pairs.push(("industry_mapping", self.industry_mapping.clone()));
        pairs
    }
}

impl KkDataClient {
    /// Create a new factor in the catalog and return its record.
    pub async fn create_factor(&self, factor: &NewFactor) -> Result<Value> {
        let url = self.url("api/v1/factors/", &[])?;
        debug!(name = %factor.name, category = %factor.category, "Creating factor");
        self.send_json(self.authorize(self.http().post(url)).json(factor))
            .await
    }

    /// List catalog factors, optionally filtered by category.
    pub async fn list_factors(&self, category: Option<FactorCategory>) -> Result<Value> {
        let params: Vec<(&str, String)> = category
            .map(|c| vec![("category", c.as_str().to_string())])
            .unwrap_or_default();
        let url = self.url("api/v1/factors/", &params)?;
        debug!(?category, "Listing factors");
        self.send_json(self.authorize(self.http().get(url))).await
    }

    /// Fetch a single factor record.
    pub async fn get_factor(&self, factor_id: i64) -> Result<Value> {
        let url = self.url(&format!("api/v1/factors/{factor_id}"), &[])?;
        debug!(factor_id, "Fetching factor");
        self.send_json(self.authorize(self.http().get(url))).await
    }

    /// Evaluate a factor against a returns table and return its metrics.
    ///
    /// The table is sent as a JSON list of row records.
    pub async fn evaluate_factor(&self, factor_id: i64, returns_data: &DataFrame) -> Result<Value> {
        let url = self.url(&format!("api/v1/factors/{factor_id}/evaluate"), &[])?;
        let body = serde_json::json!({ "returns_data": table_to_records(returns_data)? });
        debug!(factor_id, rows = returns_data.height(), "Evaluating factor");
        self.send_json(self.authorize(self.http().post(url)).json(&body))
            .await
    }

    /// Fetch factor values for securities.
    pub async fn get_factor_data(&self, request: &FactorDataRequest) -> Result<FactorResponse> {
        let params = request.query_pairs()?;
        self.fetch_factor_frame("api/v1/factors/data", &params, request.expect_table)
            .await
    }

    /// Fetch factor exposures for securities.
    pub async fn get_factor_exposure(
        &self,
        request: &FactorExposureRequest,
    ) -> Result<FactorResponse> {
        let params = request.query_pairs()?;
        self.fetch_factor_frame("api/v1/factors/exposure", &params, request.expect_table)
            .await
    }

    /// Fetch factor returns.
    pub async fn get_factor_return(&self, request: &FactorReturnRequest) -> Result<FactorResponse> {
        let params = request.query_pairs();
        self.fetch_factor_frame("api/v1/factors/return", &params, request.expect_table)
            .await
    }

    async fn fetch_factor_frame(
        &self,
        path: &str,
        params: &[(&str, String)],
        expect_table: bool,
    ) -> Result<FactorResponse> {
        let url = self.url(path, params)?;
        debug!(path, expect_table, "Fetching factor frame");

        let document: Value = self.send_json(self.authorize(self.http().get(url))).await?;
        if !expect_table {
            return Ok(FactorResponse::Json(document));
        }

        let data = document
            .get("data")
            .ok_or_else(|| KkDataError::Parse("missing `data` field".to_string()))?;
        table_from_data(data).map(FactorResponse::Table)
    }
}

/// Security codes cross the service boundary in the Internal notation.
fn push_ids(pairs: &mut Vec<(&'static str, String)>, ids: &OrderBookIds) -> Result<()> {
    let ids = ids.normalize(Notation::Internal)?;
    pairs.extend(ids.into_vec().into_iter().map(|id| ("order_book_ids", id)));
    Ok(())
}

fn push_factors(pairs: &mut Vec<(&'static str, String)>, factors: Option<&[String]>) {
    if let Some(factors) = factors {
        pairs.extend(factors.iter().map(|f| ("factors", f.clone())));
    }
}

fn push_date(pairs: &mut Vec<(&'static str, String)>, key: &'static str, date: Option<NaiveDate>) {
    if let Some(date) = date {
        pairs.push((key, date.format(DATE_FORMAT).to_string()));
    }
}

/// Build a table from a `data` field: a hex wire payload or a list of records.
fn table_from_data(data: &Value) -> Result<DataFrame> {
    match data {
        Value::String(payload) => codec::decode(payload),
        Value::Array(rows) if rows.is_empty() => Ok(DataFrame::empty()),
        Value::Array(_) => {
            let bytes = serde_json::to_vec(data).map_err(|e| KkDataError::Parse(e.to_string()))?;
            JsonReader::new(Cursor::new(bytes))
                .finish()
                .map_err(|e| KkDataError::Deserialize(e.to_string()))
        }
        other => Err(KkDataError::Parse(format!(
            "expected a payload string or a record list, got {other}"
        ))),
    }
}

/// Render a table as a JSON list of row records.
fn table_to_records(df: &DataFrame) -> Result<Value> {
    let mut buf = Vec::new();
    let mut df = df.clone();
    JsonWriter::new(&mut buf)
        .with_json_format(JsonFormat::Json)
        .finish(&mut df)
        .map_err(|e| KkDataError::Serialize(e.to_string()))?;
    serde_json::from_slice(&buf).map_err(|e| KkDataError::Serialize(e.to_string()))
}
