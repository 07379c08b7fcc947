//! 종목별 데이터 시작일 카탈로그.
//!
//! 종목 식별자 → 최초 데이터 날짜(`YYYY-MM-DD`) 조회 테이블입니다. 등록되지 않은
//! 종목은 대체 시작일(기본 1920-01-01)을 사용하고, 종료일은 모든 종목에 공통입니다.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::horizon::HistoryBounds;
use crate::domain::price_series::PriceSeries;
use crate::error::{SaverError, SaverResult};

/// 날짜 문자열 형식.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 등록되지 않은 종목의 기본 시작일.
pub const DEFAULT_FALLBACK_START: &str = "1920-01-01";

/// 공통 데이터 종료일 기본값.
pub const DEFAULT_HISTORY_END: &str = "2020-01-01";

/// 날짜 문자열(YYYY-MM-DD)을 파싱합니다.
pub fn parse_date(s: &str) -> SaverResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| SaverError::Data(format!("잘못된 날짜 형식: {} ({})", s, e)))
}

/// 종목별 데이터 범위 카탈로그.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryCatalog {
    /// 등록되지 않은 종목의 시작일
    #[serde(default = "default_fallback_start")]
    pub fallback_start: String,
    /// 공통 종료일
    #[serde(default = "default_end")]
    pub end: String,
    /// 종목 → 최초 데이터 날짜
    #[serde(default)]
    pub earliest: HashMap<String, String>,
}

fn default_fallback_start() -> String {
    DEFAULT_FALLBACK_START.to_string()
}
fn default_end() -> String {
    DEFAULT_HISTORY_END.to_string()
}

impl Default for HistoryCatalog {
    fn default() -> Self {
        Self {
            fallback_start: default_fallback_start(),
            end: default_end(),
            earliest: HashMap::new(),
        }
    }
}

impl HistoryCatalog {
    /// 빈 카탈로그를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목의 최초 데이터 날짜를 등록합니다.
    pub fn with_entry(mut self, instrument: impl Into<String>, earliest: impl Into<String>) -> Self {
        self.earliest.insert(instrument.into(), earliest.into());
        self
    }

    /// 공통 종료일을 설정합니다.
    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end = end.into();
        self
    }

    /// 종목의 데이터 범위를 반환합니다.
    pub fn bounds(&self, instrument: &str) -> SaverResult<HistoryBounds> {
        // 설정 파일 키는 소문자로 바뀔 수 있으므로 대소문자를 무시합니다
        let entry = self
            .earliest
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(instrument))
            .map(|(_, date)| date);
        let start = match entry {
            Some(s) => parse_date(s)?,
            None => parse_date(&self.fallback_start)?,
        };
        let end = parse_date(&self.end)?;

        if start > end {
            return Err(SaverError::Data(format!(
                "{}의 시작일 {}이 종료일 {}보다 늦습니다",
                instrument, start, end
            )));
        }

        Ok(HistoryBounds { start, end })
    }

    /// 카탈로그 범위를 실제 로드된 시계열 범위와 교차시킵니다.
    pub fn bounds_for_series(
        &self,
        instrument: &str,
        series: &PriceSeries,
    ) -> SaverResult<HistoryBounds> {
        let catalog = self.bounds(instrument)?;
        let start = catalog.start.max(series.first_date());
        let end = catalog.end.min(series.last_date());

        if start > end {
            return Err(SaverError::Data(format!(
                "{}의 가격 데이터가 카탈로그 범위({} ~ {})와 겹치지 않습니다",
                instrument, catalog.start, catalog.end
            )));
        }

        Ok(HistoryBounds { start, end })
    }
}
