//! 시뮬레이션 기간(horizon) 선택.
//!
//! 시계열 시작일에서 `year_offset`년 뒤를 시작으로, `horizon_years`년 길이의
//! 고정 기간을 선택합니다. 연 단위 이동은 달력 기준이며 2월 29일은 2월 28일로
//! 맞춰집니다.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SaverError, SaverResult};

/// 선택 가능한 데이터 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryBounds {
    /// 데이터 시작일
    pub start: NaiveDate,
    /// 데이터 종료일
    pub end: NaiveDate,
}

/// 시뮬레이션 기간 (양 끝 포함).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    /// 기간 시작일
    pub start: NaiveDate,
    /// 기간 종료일
    pub end: NaiveDate,
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}

/// 날짜를 달력 기준으로 `years`년 뒤로 이동합니다.
pub fn shift_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(years.checked_mul(12)?))
}

/// 시뮬레이션 기간을 선택합니다.
///
/// # 에러
///
/// `year_offset`이 음수이거나, `horizon_years`가 0 이하이거나, 기간 종료일이
/// 데이터 종료일을 넘으면 `SaverError::InvalidRange`를 반환합니다.
pub fn select_horizon(
    bounds: HistoryBounds,
    year_offset: i32,
    horizon_years: i32,
) -> SaverResult<Horizon> {
    if year_offset < 0 {
        return Err(SaverError::InvalidRange(format!(
            "year_offset은 0 이상이어야 합니다: {}",
            year_offset
        )));
    }
    if horizon_years <= 0 {
        return Err(SaverError::InvalidRange(format!(
            "horizon_years는 0보다 커야 합니다: {}",
            horizon_years
        )));
    }

    let start = shift_years(bounds.start, year_offset as u32).ok_or_else(|| {
        SaverError::InvalidRange(format!("날짜 범위를 벗어났습니다: offset={}", year_offset))
    })?;
    let end = shift_years(start, horizon_years as u32).ok_or_else(|| {
        SaverError::InvalidRange(format!(
            "날짜 범위를 벗어났습니다: horizon={}",
            horizon_years
        ))
    })?;

    if end > bounds.end {
        return Err(SaverError::InvalidRange(format!(
            "기간 종료일 {}이 데이터 종료일 {}을 넘습니다 (offset={}, horizon={})",
            end, bounds.end, year_offset, horizon_years
        )));
    }

    debug!(%start, %end, year_offset, horizon_years, "horizon resolved");

    Ok(Horizon { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bounds() -> HistoryBounds {
        HistoryBounds {
            start: date(1993, 1, 29),
            end: date(2020, 1, 1),
        }
    }

    #[test]
    fn test_select_horizon() {
        let horizon = select_horizon(bounds(), 2, 20).unwrap();
        assert_eq!(horizon.start, date(1995, 1, 29));
        assert_eq!(horizon.end, date(2015, 1, 29));
    }

    #[test]
    fn test_zero_offset_starts_at_series_start() {
        let horizon = select_horizon(bounds(), 0, 1).unwrap();
        assert_eq!(horizon.start, date(1993, 1, 29));
        assert_eq!(horizon.end, date(1994, 1, 29));
    }

    #[test]
    fn test_leap_day_is_clamped() {
        let bounds = HistoryBounds {
            start: date(2000, 2, 29),
            end: date(2020, 1, 1),
        };
        let horizon = select_horizon(bounds, 1, 1).unwrap();
        assert_eq!(horizon.start, date(2001, 2, 28));
        assert_eq!(horizon.end, date(2002, 2, 28));
    }

    #[test]
    fn test_negative_values_rejected() {
        assert!(matches!(
            select_horizon(bounds(), -1, 20),
            Err(SaverError::InvalidRange(_))
        ));
        assert!(matches!(
            select_horizon(bounds(), 0, -5),
            Err(SaverError::InvalidRange(_))
        ));
        assert!(matches!(
            select_horizon(bounds(), 0, 0),
            Err(SaverError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_horizon_past_data_end_rejected() {
        // 1993 + 7 + 20 = 2020-01-29 > 2020-01-01
        assert!(matches!(
            select_horizon(bounds(), 7, 20),
            Err(SaverError::InvalidRange(_))
        ));
        assert!(select_horizon(bounds(), 6, 20).is_ok());
    }
}
