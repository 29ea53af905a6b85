//! SQL builders for common queries.
//!
//! The tables follow the Tushare schema (`daily`, `income`, `balancesheet`),
//! keyed by `ts_code` in the Internal notation. Dates are rendered as
//! `YYYYMMDD`, the format of the `trade_date` and `end_date` columns.

use chrono::NaiveDate;
use kkdata_core::{KkDataError, Notation, OrderBookIds, Result};

const DATE_FORMAT: &str = "%Y%m%d";

/// Daily OHLCV bars for the given securities.
pub fn daily_price(
    codes: &OrderBookIds,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<String> {
    let mut query = format!(
        "SELECT ts_code, trade_date, open, high, low, close, vol AS volume, amount \
         FROM daily WHERE ts_code IN ({})",
        security_list(codes)?
    );
    if let Some(start) = start {
        query.push_str(&format!(" AND trade_date >= '{}'", start.format(DATE_FORMAT)));
    }
    if let Some(end) = end {
        query.push_str(&format!(" AND trade_date <= '{}'", end.format(DATE_FORMAT)));
    }
    query.push_str(" ORDER BY ts_code, trade_date");
    Ok(query)
}

/// Income statement lines for the given securities.
pub fn income_statement(codes: &OrderBookIds, start: Option<NaiveDate>) -> Result<String> {
    statement(
        "ann_date, f_ann_date, end_date, revenue, operate_profit, total_profit, n_income",
        "income",
        codes,
        start,
    )
}

/// Balance sheet lines for the given securities.
pub fn balance_sheet(codes: &OrderBookIds, start: Option<NaiveDate>) -> Result<String> {
    statement(
        "ann_date, f_ann_date, end_date, total_assets, total_liab, total_hldr_eqy_exc_min_int",
        "balancesheet",
        codes,
        start,
    )
}

fn statement(
    columns: &str,
    table: &str,
    codes: &OrderBookIds,
    start: Option<NaiveDate>,
) -> Result<String> {
    let mut query = format!(
        "SELECT ts_code, {columns} FROM {table} WHERE ts_code IN ({})",
        security_list(codes)?
    );
    if let Some(start) = start {
        query.push_str(&format!(" AND end_date >= '{}'", start.format(DATE_FORMAT)));
    }
    query.push_str(" ORDER BY ts_code, end_date");
    Ok(query)
}

/// Quoted, comma separated `ts_code` list.
fn security_list(codes: &OrderBookIds) -> Result<String> {
    if codes.is_empty() {
        return Err(KkDataError::InvalidParameter(
            "at least one security code is required".to_string(),
        ));
    }

    let codes = codes.normalize(Notation::Internal)?;
    Ok(codes
        .iter()
        .map(|code| format!("'{}'", code.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", "))
}
