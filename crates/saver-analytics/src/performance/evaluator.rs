//! 연도별 성과 평가.
//!
//! 각 연도 말 기준으로 누적 보유 주식 수 × 그 해 마지막 거래일 시가를
//! 포트폴리오 가치로 보고, 누적 투자금 대비 평가 이익과 수익률을 계산합니다.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use saver_core::{Amount, PlanRecord, Price, YearlySummary};

/// 한 해 동안의 누적값.
#[derive(Debug, Default)]
struct YearAccumulator {
    shares: Decimal,
    invested: Amount,
    last_open: Price,
}

/// 투자 수익률. 누적 투자금이 0이면 정의되지 않습니다.
pub fn roi_for(gain: Amount, invested: Amount) -> Option<Decimal> {
    if invested.is_zero() {
        None
    } else {
        Some(gain / invested)
    }
}

/// 투자 계획에서 연도별 성과를 계산합니다.
///
/// 결과는 연도 오름차순이며, 계획에 등장하는 연도마다 하나씩 생성됩니다.
pub fn evaluate(plan: &[PlanRecord]) -> Vec<YearlySummary> {
    let mut years: BTreeMap<i32, YearAccumulator> = BTreeMap::new();
    for record in plan {
        let entry = years.entry(record.daily().year()).or_default();
        entry.shares += record.share_amount;
        entry.invested += record.investment_amount;
        // 날짜 오름차순이므로 마지막으로 본 시가가 연말 시가
        entry.last_open = record.open();
    }

    let mut cumulative_shares = Decimal::ZERO;
    let mut cumulative_invested = Decimal::ZERO;

    let summaries: Vec<YearlySummary> = years
        .into_iter()
        .map(|(year, acc)| {
            cumulative_shares += acc.shares;
            cumulative_invested += acc.invested;

            let portfolio_value = cumulative_shares * acc.last_open;
            let gain = portfolio_value - cumulative_invested;

            YearlySummary {
                year,
                portfolio_value,
                cumulative_invested,
                gain,
                roi: roi_for(gain, cumulative_invested),
            }
        })
        .collect();

    if let Some(last) = summaries.last() {
        debug!(
            years = summaries.len(),
            final_value = %last.portfolio_value,
            invested = %last.cumulative_invested,
            "performance evaluated"
        );
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use saver_core::{AnnotatedRecord, CapitalizedRecord, DailyRecord};

    fn record(y: i32, m: u32, d: u32, open: Decimal, amount: Decimal) -> PlanRecord {
        PlanRecord {
            capitalized: CapitalizedRecord {
                annotated: AnnotatedRecord {
                    daily: DailyRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), open, open, open),
                    moving_max: open,
                    percent_drop: Some(dec!(0)),
                },
                available_capital: Some(amount),
            },
            buy: !amount.is_zero(),
            investment_percent: if amount.is_zero() { dec!(0) } else { dec!(1) },
            investment_amount: amount,
            cash: Some(dec!(0)),
            share_amount: if amount.is_zero() { dec!(0) } else { amount / open },
            source: None,
        }
    }

    #[test]
    fn test_two_year_roi() {
        let plan = vec![
            record(2004, 1, 2, dec!(10), dec!(100)),
            record(2004, 12, 31, dec!(12), dec!(0)),
            record(2005, 1, 3, dec!(20), dec!(100)),
            record(2005, 12, 30, dec!(25), dec!(0)),
        ];
        let summaries = evaluate(&plan);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].year, 2004);
        assert_eq!(summaries[0].portfolio_value, dec!(120));
        assert_eq!(summaries[0].cumulative_invested, dec!(100));
        assert_eq!(summaries[0].gain, dec!(20));
        assert_eq!(summaries[0].roi, Some(dec!(0.2)));

        assert_eq!(summaries[1].portfolio_value, dec!(375));
        assert_eq!(summaries[1].cumulative_invested, dec!(200));
        assert_eq!(summaries[1].gain, dec!(175));
        assert_eq!(summaries[1].roi, Some(dec!(0.875)));
    }

    #[test]
    fn test_year_without_investment_has_no_roi() {
        let plan = vec![record(2004, 6, 1, dec!(10), dec!(0))];
        let summaries = evaluate(&plan);
        assert_eq!(summaries[0].roi, None);
        assert!(summaries[0].roi_checked().is_err());
    }

    #[test]
    fn test_empty_plan() {
        assert!(evaluate(&[]).is_empty());
    }

    #[test]
    fn test_roi_for() {
        assert_eq!(roi_for(dec!(50), dec!(200)), Some(dec!(0.25)));
        assert_eq!(roi_for(dec!(50), dec!(0)), None);
    }
}
