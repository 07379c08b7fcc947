//! 가격 데이터 CSV 로더.
//!
//! Yahoo Finance에서 내려받은 일봉 CSV 형식을 읽습니다:
//!
//! ```text
//! Date,Open,High,Low,Close,Adj Close,Volume
//! 1993-01-29,43.968750,43.968750,43.750000,43.937500,25.799969,1003200
//! ```
//!
//! `Adj Close` 열이 없으면 `Close`를 사용합니다. 값이 `null`이거나 비어 있는
//! 행은 경고를 남기고 건너뜁니다.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use saver_core::{parse_date, DailyRecord, PriceSeries};

/// CSV 행 (원시 문자열).
#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Close", default)]
    close: Option<String>,
    #[serde(rename = "Adj Close", alias = "Adj_Close", alias = "adjclose", default)]
    adj_close: Option<String>,
}

fn parse_value(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return None;
    }
    Decimal::from_str(raw).ok()
}

impl PriceRow {
    fn into_record(self) -> Result<Option<DailyRecord>> {
        let date = parse_date(&self.date)?;
        let adjusted = self.adj_close.as_deref().or(self.close.as_deref()).unwrap_or("");

        match (
            parse_value(&self.open),
            parse_value(&self.high),
            parse_value(adjusted),
        ) {
            (Some(open), Some(high), Some(adjusted_close)) => {
                Ok(Some(DailyRecord::new(date, open, high, adjusted_close)))
            }
            _ => {
                warn!(%date, "값이 비어 있는 행을 건너뜁니다");
                Ok(None)
            }
        }
    }
}

/// 리더에서 가격 시계열을 읽습니다.
pub fn read_price_series<R: Read>(reader: R) -> Result<PriceSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, result) in rdr.deserialize::<PriceRow>().enumerate() {
        let row = result.with_context(|| format!("CSV {}번째 행을 읽을 수 없습니다", line + 2))?;
        match row.into_record()? {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    records.sort_by_key(|r| r.date);
    debug!(rows = records.len(), skipped, "price rows parsed");

    Ok(PriceSeries::new(records)?)
}

/// CSV 파일에서 가격 시계열을 로드합니다.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("가격 데이터 파일을 열 수 없습니다: {}", path.display()))?;
    let series = read_price_series(file)
        .with_context(|| format!("가격 데이터를 읽는 중 오류: {}", path.display()))?;

    info!(
        path = %path.display(),
        records = series.len(),
        from = %series.first_date(),
        to = %series.last_date(),
        "가격 데이터 로드 완료"
    );

    Ok(series)
}

/// 파일 이름에서 종목 식별자를 추정합니다 (예: `data/SPY.csv` → `SPY`).
pub fn instrument_from_path(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.split('_').next())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}
