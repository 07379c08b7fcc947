//! 일별 투자 계획 생성.
//!
//! 레코드를 날짜 순으로 한 번 훑으며 상태를 접어(fold) 나갑니다. 각 거래일 `t`에서:
//!
//! 1. 매월 첫 거래일이면 첫 적립 자본 × 매월 투자 비율만큼 매수합니다.
//! 2. 전날(`t-1`)의 하락 신호가 대기 중이면, 오늘 매월 매수가 이미 있을 때는
//!    버리고 그렇지 않으면 오늘 시가로 가용 현금 × 투자 비율만큼 매수합니다.
//! 3. 오늘의 하락률이 임계값 이상이고 마지막 하락 매수 신호로부터
//!    `waiting_days` 이상 지났으면 내일 실행할 신호를 등록합니다. 마지막
//!    거래일의 신호는 실행할 다음 날이 없으므로 버립니다.
//!
//! 버려진 신호는 마지막 매수 시점을 갱신하지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use saver_core::{Amount, BuySource, CapitalizedRecord, Percentage, PlanRecord, SaverError, SaverResult};

use super::strategy::Strategy;
use crate::capital::month_start_flags;

/// 계획 생성 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    /// 매월 적립 매수 횟수
    pub monthly_buys: usize,
    /// 하락 매수 횟수
    pub drawdown_buys: usize,
    /// 같은 날 매월 매수와 겹쳐 버려진 하락 신호 수
    pub suppressed_triggers: usize,
    /// 마지막 거래일에 발생해 실행되지 못한 하락 신호 수
    pub final_day_triggers: usize,
}

impl PlanStats {
    pub fn total_buys(&self) -> usize {
        self.monthly_buys + self.drawdown_buys
    }
}

/// 다음 거래일에 실행할 하락 매수 신호.
#[derive(Debug, Clone, Copy)]
struct PendingBuy {
    trigger_index: usize,
    percent: Percentage,
}

/// 접기 상태.
#[derive(Debug)]
struct PlanState {
    last_buy_index: i64,
    cumulative_invested: Amount,
    pending: Option<PendingBuy>,
    stats: PlanStats,
}

/// 하루치 매수 결정.
struct BuyDecision {
    percent: Percentage,
    amount: Amount,
    source: BuySource,
}

/// 투자 계획 생성기.
#[derive(Debug, Clone)]
pub struct InvestmentPlanner {
    strategy: Strategy,
}

impl InvestmentPlanner {
    /// 전략을 검증하고 계획 생성기를 만듭니다.
    pub fn new(strategy: Strategy) -> SaverResult<Self> {
        strategy.validate()?;
        Ok(Self { strategy })
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// 자본이 적립된 레코드로부터 일별 투자 계획을 만듭니다.
    ///
    /// # 에러
    ///
    /// 시가가 0 이하인 레코드가 있으면 `SaverError::Data`를 반환합니다.
    pub fn plan(&self, records: Vec<CapitalizedRecord>) -> SaverResult<(Vec<PlanRecord>, PlanStats)> {
        if let Some(bad) = records.iter().find(|r| r.daily().open <= Decimal::ZERO) {
            return Err(SaverError::Data(format!(
                "{}의 시가가 0 이하입니다: {}",
                bad.daily().date,
                bad.daily().open
            )));
        }

        let month_starts = month_start_flags(records.iter().map(|r| r.daily()));
        // 매월 적립액 기준은 첫 적립 자본 (monthly_savings와 같음)
        let base_amount = records
            .iter()
            .find_map(|r| r.available_capital)
            .unwrap_or(Decimal::ZERO);
        let last_index = records.len().saturating_sub(1);

        let initial = PlanState {
            last_buy_index: self
                .strategy
                .drop_rule()
                .map_or(0, |rule| -(rule.waiting_days as i64)),
            cumulative_invested: Decimal::ZERO,
            pending: None,
            stats: PlanStats::default(),
        };

        let (plan, state) = records.into_iter().enumerate().fold(
            (Vec::with_capacity(last_index + 1), initial),
            |(mut plan, mut state), (index, record)| {
                let next = self.step(
                    &mut state,
                    index,
                    record,
                    month_starts[index],
                    base_amount,
                    last_index,
                );
                plan.push(next);
                (plan, state)
            },
        );

        debug!(
            strategy = self.strategy.label(),
            days = plan.len(),
            monthly_buys = state.stats.monthly_buys,
            drawdown_buys = state.stats.drawdown_buys,
            suppressed = state.stats.suppressed_triggers,
            invested = %state.cumulative_invested,
            "investment plan created"
        );

        Ok((plan, state.stats))
    }

    fn step(
        &self,
        state: &mut PlanState,
        index: usize,
        record: CapitalizedRecord,
        month_start: bool,
        base_amount: Amount,
        last_index: usize,
    ) -> PlanRecord {
        let capital = record.available_capital;
        let monthly_percent = self.strategy.monthly_percent();

        let decision = if month_start && monthly_percent > Decimal::ZERO {
            if let Some(pending) = state.pending.take() {
                trace!(
                    date = %record.daily().date,
                    trigger_index = pending.trigger_index,
                    "drawdown buy suppressed by monthly buy"
                );
                state.stats.suppressed_triggers += 1;
            }
            state.stats.monthly_buys += 1;
            Some(BuyDecision {
                percent: monthly_percent,
                amount: base_amount * monthly_percent,
                source: BuySource::Monthly,
            })
        } else if let Some(pending) = state.pending.take() {
            let cash = capital.unwrap_or(Decimal::ZERO) - state.cumulative_invested;
            state.last_buy_index = pending.trigger_index as i64;
            state.stats.drawdown_buys += 1;
            trace!(
                date = %record.daily().date,
                percent = %pending.percent,
                cash = %cash,
                "drawdown buy"
            );
            Some(BuyDecision {
                percent: pending.percent,
                amount: cash * pending.percent,
                source: BuySource::Drawdown,
            })
        } else {
            None
        };

        if let Some(rule) = self.strategy.drop_rule() {
            let triggered = record
                .percent_drop()
                .filter(|drop| rule.is_triggered(*drop));
            let waited = index as i64 - state.last_buy_index >= rule.waiting_days as i64;

            if let (Some(drop), true) = (triggered, waited) {
                if index == last_index {
                    state.stats.final_day_triggers += 1;
                } else {
                    state.pending = Some(PendingBuy {
                        trigger_index: index,
                        percent: rule.investment_percent(drop),
                    });
                }
            }
        }

        let (buy, investment_percent, investment_amount, source) = match decision {
            Some(d) => (true, d.percent, d.amount, Some(d.source)),
            None => (false, Decimal::ZERO, Decimal::ZERO, None),
        };

        state.cumulative_invested += investment_amount;
        let share_amount = if investment_amount.is_zero() {
            Decimal::ZERO
        } else {
            investment_amount / record.daily().open
        };

        PlanRecord {
            cash: capital.map(|c| c - state.cumulative_invested),
            capitalized: record,
            buy,
            investment_percent,
            investment_amount,
            share_amount,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::strategy::DropRule;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use saver_core::{AnnotatedRecord, DailyRecord};

    fn day(
        (y, m, d): (i32, u32, u32),
        open: Decimal,
        drop: Decimal,
        capital: Decimal,
    ) -> CapitalizedRecord {
        CapitalizedRecord {
            annotated: AnnotatedRecord {
                daily: DailyRecord::new(NaiveDate::from_ymd_opt(y, m, d).unwrap(), open, open, open),
                moving_max: open,
                percent_drop: Some(drop),
            },
            available_capital: Some(capital),
        }
    }

    fn rule(waiting_days: usize) -> DropRule {
        DropRule {
            threshold: dec!(0.035),
            waiting_days,
            multiplier: 9,
        }
    }

    #[test]
    fn test_monthly_strategy_invests_full_savings() {
        let records = vec![
            day((2004, 1, 2), dec!(100), dec!(0), dec!(1000)),
            day((2004, 1, 5), dec!(90), dec!(0.1), dec!(1000)),
            day((2004, 2, 2), dec!(50), dec!(0), dec!(2000)),
        ];
        let planner = InvestmentPlanner::new(Strategy::MonthlyInvest).unwrap();
        let (plan, stats) = planner.plan(records).unwrap();

        assert!(plan[0].buy);
        assert_eq!(plan[0].investment_amount, dec!(1000));
        assert_eq!(plan[0].share_amount, dec!(10));
        assert_eq!(plan[0].cash, Some(dec!(0)));
        assert!(!plan[1].buy);
        assert_eq!(plan[2].share_amount, dec!(20));
        assert_eq!(stats.monthly_buys, 2);
        assert_eq!(stats.drawdown_buys, 0);
    }

    #[test]
    fn test_market_timing_buys_next_day() {
        let records = vec![
            day((2004, 1, 2), dec!(100), dec!(0), dec!(1000)),
            day((2004, 1, 5), dec!(100), dec!(0.05), dec!(1000)),
            day((2004, 1, 6), dec!(100), dec!(0), dec!(1000)),
        ];
        let planner = InvestmentPlanner::new(Strategy::MarketTiming(rule(3))).unwrap();
        let (plan, stats) = planner.plan(records).unwrap();

        assert!(!plan[0].buy);
        assert!(!plan[1].buy);
        assert!(plan[2].buy);
        assert_eq!(plan[2].investment_percent, dec!(0.45));
        assert_eq!(plan[2].investment_amount, dec!(450));
        assert_eq!(plan[2].cash, Some(dec!(550)));
        assert_eq!(plan[2].source, Some(BuySource::Drawdown));
        assert_eq!(stats.drawdown_buys, 1);
    }

    #[test]
    fn test_waiting_days_between_triggers() {
        let records: Vec<_> = (2..=9)
            .map(|d| day((2004, 1, d), dec!(100), dec!(0.05), dec!(1000)))
            .collect();
        let planner = InvestmentPlanner::new(Strategy::MarketTiming(rule(3))).unwrap();
        let (plan, stats) = planner.plan(records).unwrap();

        // 신호: index 0, 3, 6 → 매수: index 1, 4, 7
        let buys: Vec<usize> = plan
            .iter()
            .enumerate()
            .filter(|(_, r)| r.buy)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(buys, vec![1, 4, 7]);
        assert_eq!(stats.drawdown_buys, 3);
    }

    #[test]
    fn test_hybrid_suppresses_trigger_before_month_start() {
        let records = vec![
            day((2004, 1, 30), dec!(100), dec!(0.05), dec!(1000)),
            day((2004, 2, 2), dec!(100), dec!(0), dec!(2000)),
            day((2004, 2, 3), dec!(100), dec!(0), dec!(2000)),
        ];
        let strategy = Strategy::hybrid(dec!(0.9), rule(3)).unwrap();
        let (plan, stats) = InvestmentPlanner::new(strategy).unwrap().plan(records).unwrap();

        assert_eq!(plan[1].source, Some(BuySource::Monthly));
        assert_eq!(plan[1].investment_amount, dec!(900));
        assert!(!plan[2].buy);
        assert_eq!(stats.suppressed_triggers, 1);
        assert_eq!(stats.drawdown_buys, 0);
    }

    #[test]
    fn test_suppressed_trigger_does_not_reset_waiting() {
        // index 1 신호는 버려지고, index 2 신호는 대기 없이 바로 유효
        let records = vec![
            day((2004, 1, 29), dec!(100), dec!(0), dec!(1000)),
            day((2004, 1, 30), dec!(100), dec!(0.05), dec!(1000)),
            day((2004, 2, 2), dec!(100), dec!(0.05), dec!(2000)),
            day((2004, 2, 3), dec!(100), dec!(0), dec!(2000)),
        ];
        let strategy = Strategy::hybrid(dec!(0.5), rule(3)).unwrap();
        let (plan, stats) = InvestmentPlanner::new(strategy).unwrap().plan(records).unwrap();

        assert_eq!(stats.suppressed_triggers, 1);
        assert!(plan[3].buy);
        assert_eq!(plan[3].source, Some(BuySource::Drawdown));
        // 현금 = 2000 - (500 + 500) = 1000, 투자 비율 0.45
        assert_eq!(plan[3].investment_amount, dec!(450));
    }

    #[test]
    fn test_final_day_trigger_dropped() {
        let records = vec![
            day((2004, 1, 2), dec!(100), dec!(0), dec!(1000)),
            day((2004, 1, 5), dec!(100), dec!(0.05), dec!(1000)),
        ];
        let planner = InvestmentPlanner::new(Strategy::MarketTiming(rule(1))).unwrap();
        let (plan, stats) = planner.plan(records).unwrap();

        assert!(plan.iter().all(|r| !r.buy));
        assert_eq!(stats.final_day_triggers, 1);
    }

    #[test]
    fn test_investment_percent_capped_at_one() {
        let records = vec![
            day((2004, 1, 2), dec!(100), dec!(0.5), dec!(1000)),
            day((2004, 1, 5), dec!(100), dec!(0), dec!(1000)),
        ];
        let planner = InvestmentPlanner::new(Strategy::MarketTiming(rule(1))).unwrap();
        let (plan, _) = planner.plan(records).unwrap();

        assert_eq!(plan[1].investment_percent, dec!(1));
        assert_eq!(plan[1].cash, Some(dec!(0)));
    }

    #[test]
    fn test_non_positive_open_rejected() {
        let records = vec![day((2004, 1, 2), dec!(0), dec!(0), dec!(1000))];
        let planner = InvestmentPlanner::new(Strategy::MonthlyInvest).unwrap();
        assert!(matches!(planner.plan(records), Err(SaverError::Data(_))));
    }

    #[test]
    fn test_empty_plan() {
        let planner = InvestmentPlanner::new(Strategy::MonthlyInvest).unwrap();
        let (plan, stats) = planner.plan(Vec::new()).unwrap();
        assert!(plan.is_empty());
        assert_eq!(stats, PlanStats::default());
    }
}
