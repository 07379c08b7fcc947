//! 단일 종목의 일별 가격 시계열.

use chrono::NaiveDate;

use crate::domain::horizon::Horizon;
use crate::domain::records::DailyRecord;
use crate::error::{SaverError, SaverResult};

/// 날짜순으로 정렬된 일별 가격 시계열.
///
/// 생성 시점에 날짜가 엄격히 증가하는지(중복 없음) 검증합니다.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    records: Vec<DailyRecord>,
}

impl PriceSeries {
    /// 일별 레코드로 시계열을 생성합니다.
    pub fn new(records: Vec<DailyRecord>) -> SaverResult<Self> {
        if records.is_empty() {
            return Err(SaverError::Data("가격 데이터가 비어있습니다".to_string()));
        }

        for window in records.windows(2) {
            if window[0].date >= window[1].date {
                return Err(SaverError::Data(format!(
                    "가격 데이터가 날짜순으로 정렬되어 있지 않거나 중복됩니다: {} → {}",
                    window[0].date, window[1].date
                )));
            }
        }

        Ok(Self { records })
    }

    /// 전체 레코드를 반환합니다.
    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 첫 거래일.
    pub fn first_date(&self) -> NaiveDate {
        self.records[0].date
    }

    /// 마지막 거래일.
    pub fn last_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// `start <= date <= end` 구간의 레코드를 반환합니다 (양 끝 포함).
    pub fn slice(&self, horizon: &Horizon) -> &[DailyRecord] {
        let from = self.records.partition_point(|r| r.date < horizon.start);
        let to = self.records.partition_point(|r| r.date <= horizon.end);
        &self.records[from..to.max(from)]
    }
}
