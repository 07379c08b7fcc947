//! 차트 데이터 구조.
//!
//! 연도별 포트폴리오 가치/누적 투자금 곡선과 X축 눈금을 생성합니다.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saver_core::{PlanRecord, YearlySummary};

/// 차트 데이터 포인트.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// X축 값 (날짜)
    pub x: NaiveDate,
    /// Y축 값
    pub y: Decimal,
}

/// 연도별 가치 차트.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyValueChart {
    /// X축 눈금
    pub ticks: Vec<NaiveDate>,
    /// 연말 포트폴리오 가치
    pub portfolio_value: Vec<ChartPoint>,
    /// 누적 투자금
    pub cumulative_invested: Vec<ChartPoint>,
}

impl YearlyValueChart {
    /// 계획과 연도별 성과로 차트 데이터를 생성합니다.
    ///
    /// 각 연도 값은 그 해 12월 31일에 찍습니다.
    pub fn new(plan: &[PlanRecord], summaries: &[YearlySummary]) -> Self {
        let points = |value: fn(&YearlySummary) -> Decimal| -> Vec<ChartPoint> {
            summaries
                .iter()
                .filter_map(|s| {
                    NaiveDate::from_ymd_opt(s.year, 12, 31).map(|x| ChartPoint { x, y: value(s) })
                })
                .collect()
        };

        Self {
            ticks: yearly_axis_ticks(plan),
            portfolio_value: points(|s| s.portfolio_value),
            cumulative_invested: points(|s| s.cumulative_invested),
        }
    }
}

fn new_year(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// 연도별 X축 눈금을 생성합니다.
///
/// (첫 연도 - 1)의 1월 1일, 각 연도의 첫 거래일, (마지막 연도 + 1)과
/// (마지막 연도 + 2)의 1월 1일 순서입니다. 빈 계획이면 빈 벡터를 반환합니다.
pub fn yearly_axis_ticks(plan: &[PlanRecord]) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (plan.first(), plan.last()) else {
        return Vec::new();
    };
    let first_year = first.date().year();
    let last_year = last.date().year();

    let mut ticks: Vec<NaiveDate> = new_year(first_year - 1).into_iter().collect();

    let mut previous_year = None;
    for record in plan {
        let date = record.date();
        if previous_year != Some(date.year()) {
            ticks.push(date);
            previous_year = Some(date.year());
        }
    }

    ticks.extend(new_year(last_year + 1));
    ticks.extend(new_year(last_year + 2));
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use saver_core::{AnnotatedRecord, CapitalizedRecord, DailyRecord};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(date: NaiveDate) -> PlanRecord {
        PlanRecord {
            capitalized: CapitalizedRecord {
                annotated: AnnotatedRecord {
                    daily: DailyRecord::new(date, dec!(1), dec!(1), dec!(1)),
                    moving_max: dec!(1),
                    percent_drop: Some(dec!(0)),
                },
                available_capital: Some(dec!(0)),
            },
            buy: false,
            investment_percent: dec!(0),
            investment_amount: dec!(0),
            cash: Some(dec!(0)),
            share_amount: dec!(0),
            source: None,
        }
    }

    #[test]
    fn test_yearly_axis_ticks() {
        let plan = vec![
            record(date(2003, 2, 3)),
            record(date(2003, 12, 31)),
            record(date(2004, 1, 2)),
            record(date(2005, 1, 3)),
        ];
        assert_eq!(
            yearly_axis_ticks(&plan),
            vec![
                date(2002, 1, 1),
                date(2003, 2, 3),
                date(2004, 1, 2),
                date(2005, 1, 3),
                date(2006, 1, 1),
                date(2007, 1, 1),
            ]
        );
    }

    #[test]
    fn test_empty_plan_has_no_ticks() {
        assert!(yearly_axis_ticks(&[]).is_empty());
    }

    #[test]
    fn test_value_chart_points() {
        let plan = vec![record(date(2003, 2, 3))];
        let summaries = vec![YearlySummary {
            year: 2003,
            portfolio_value: dec!(120),
            cumulative_invested: dec!(100),
            gain: dec!(20),
            roi: Some(dec!(0.2)),
        }];
        let chart = YearlyValueChart::new(&plan, &summaries);

        assert_eq!(chart.ticks.len(), 4);
        assert_eq!(
            chart.portfolio_value,
            vec![ChartPoint {
                x: date(2003, 12, 31),
                y: dec!(120)
            }]
        );
        assert_eq!(chart.cumulative_invested[0].y, dec!(100));
    }
}
