//! 파이프라인 단계별 레코드 타입.
//!
//! 각 단계는 이전 단계의 레코드를 감싸고 자신의 컬럼만 추가합니다:
//! - `DailyRecord` - 입력 일별 가격
//! - `AnnotatedRecord` - 이동 최고가와 하락률
//! - `CapitalizedRecord` - 누적 가용 자본
//! - `PlanRecord` - 매수 여부, 투자 금액, 현금, 매수 주식 수
//! - `YearlySummary` - 연도별 성과

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{SaverError, SaverResult};
use crate::types::{Amount, Percentage, Price};

/// 일별 가격 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 수정 종가
    pub adjusted_close: Price,
}

impl DailyRecord {
    /// 새 일별 레코드를 생성합니다.
    pub fn new(date: NaiveDate, open: Price, high: Price, adjusted_close: Price) -> Self {
        Self {
            date,
            open,
            high,
            adjusted_close,
        }
    }

    /// (연, 월) 그룹 키를 반환합니다.
    pub fn month_key(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }

    /// 연도를 반환합니다.
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// 이동 최고가와 하락률이 추가된 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    #[serde(flatten)]
    pub daily: DailyRecord,
    /// 후행 윈도우의 고가 최댓값
    pub moving_max: Price,
    /// 1 - 수정 종가 / 이동 최고가 (이동 최고가가 0이면 None)
    pub percent_drop: Option<Percentage>,
}

/// 누적 가용 자본이 추가된 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalizedRecord {
    #[serde(flatten)]
    pub annotated: AnnotatedRecord,
    /// 이 날짜까지 적립된 자본 (첫 적립 이전에는 None)
    pub available_capital: Option<Amount>,
}

impl CapitalizedRecord {
    pub fn daily(&self) -> &DailyRecord {
        &self.annotated.daily
    }

    pub fn percent_drop(&self) -> Option<Percentage> {
        self.annotated.percent_drop
    }
}

/// 매수를 발생시킨 구간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuySource {
    /// 매월 첫 거래일 적립 매수
    Monthly,
    /// 하락률 임계값 돌파에 따른 다음 날 매수
    Drawdown,
}

/// 투자 계획의 일별 레코드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRecord {
    #[serde(flatten)]
    pub capitalized: CapitalizedRecord,
    /// 매수 여부
    pub buy: bool,
    /// 가용 현금 대비 투자 비율 [0, 1]
    pub investment_percent: Percentage,
    /// 투자 금액
    pub investment_amount: Amount,
    /// 투자 후 남은 현금 (자본이 없으면 None)
    pub cash: Option<Amount>,
    /// 시가로 매수한 주식 수
    pub share_amount: Decimal,
    /// 매수 구간
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<BuySource>,
}

impl PlanRecord {
    pub fn daily(&self) -> &DailyRecord {
        self.capitalized.daily()
    }

    pub fn date(&self) -> NaiveDate {
        self.daily().date
    }

    pub fn open(&self) -> Price {
        self.daily().open
    }

    pub fn available_capital(&self) -> Option<Amount> {
        self.capitalized.available_capital
    }

    pub fn percent_drop(&self) -> Option<Percentage> {
        self.capitalized.percent_drop()
    }
}

/// 연도별 성과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    /// 연도
    pub year: i32,
    /// 연말 포트폴리오 가치 (누적 주식 수 × 그 해 마지막 시가)
    pub portfolio_value: Amount,
    /// 누적 투자금
    pub cumulative_invested: Amount,
    /// 평가 이익
    pub gain: Amount,
    /// 투자 수익률 (누적 투자금이 0이면 None)
    pub roi: Option<Decimal>,
}

impl YearlySummary {
    /// 투자 수익률을 반환하며, 정의되지 않으면 에러를 반환합니다.
    pub fn roi_checked(&self) -> SaverResult<Decimal> {
        self.roi
            .ok_or(SaverError::DivisionUndefined { year: self.year })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_month_key() {
        let record = DailyRecord::new(
            NaiveDate::from_ymd_opt(2004, 3, 1).unwrap(),
            dec!(100),
            dec!(101),
            dec!(100.5),
        );
        assert_eq!(record.month_key(), (2004, 3));
        assert_eq!(record.year(), 2004);
    }

    #[test]
    fn test_plan_record_serializes_flat() {
        let record = PlanRecord {
            capitalized: CapitalizedRecord {
                annotated: AnnotatedRecord {
                    daily: DailyRecord::new(
                        NaiveDate::from_ymd_opt(2004, 3, 1).unwrap(),
                        dec!(100),
                        dec!(101),
                        dec!(100.5),
                    ),
                    moving_max: dec!(110),
                    percent_drop: Some(dec!(0.05)),
                },
                available_capital: Some(dec!(3000)),
            },
            buy: true,
            investment_percent: dec!(1),
            investment_amount: dec!(1000),
            cash: Some(dec!(0)),
            share_amount: dec!(10),
            source: Some(BuySource::Monthly),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2004-03-01");
        assert_eq!(json["moving_max"], "110");
        assert_eq!(json["available_capital"], "3000");
        assert_eq!(json["source"], "monthly");
        assert_eq!(json["buy"], true);

        let idle = PlanRecord {
            source: None,
            ..record
        };
        let json = serde_json::to_value(&idle).unwrap();
        assert!(json.get("source").is_none());
    }

    #[test]
    fn test_roi_checked() {
        let summary = YearlySummary {
            year: 2001,
            portfolio_value: dec!(0),
            cumulative_invested: dec!(0),
            gain: dec!(0),
            roi: None,
        };
        assert!(matches!(
            summary.roi_checked(),
            Err(SaverError::DivisionUndefined { year: 2001 })
        ));

        let summary = YearlySummary {
            roi: Some(dec!(0.2)),
            ..summary
        };
        assert_eq!(summary.roi_checked().unwrap(), dec!(0.2));
    }
}
