//! 실행 결과 보고서.

use serde::{Deserialize, Serialize};

use saver_core::{Amount, DecimalExt, Horizon, PlanRecord, YearlySummary};

use crate::charts::YearlyValueChart;
use crate::pipeline::InvestmentPlan;
use crate::planner::{PlanStats, Strategy};

/// 단일 전략 실행 보고서.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    /// 선택된 기간
    pub horizon: Horizon,
    /// 사용된 전략
    pub strategy: Strategy,
    /// 매월 적립 금액
    pub monthly_savings: Amount,
    /// 매수 통계
    pub stats: PlanStats,
    /// 연도별 성과
    pub summaries: Vec<YearlySummary>,
    /// 차트 데이터
    pub chart: YearlyValueChart,
    /// 일별 계획
    pub records: Vec<PlanRecord>,
}

impl From<InvestmentPlan> for PlanReport {
    fn from(plan: InvestmentPlan) -> Self {
        let summaries = plan.summaries();
        let chart = YearlyValueChart::new(&plan.records, &summaries);
        Self {
            horizon: plan.horizon,
            strategy: plan.strategy,
            monthly_savings: plan.monthly_savings,
            stats: plan.stats,
            summaries,
            chart,
            records: plan.records,
        }
    }
}

impl PlanReport {
    pub fn final_summary(&self) -> Option<&YearlySummary> {
        self.summaries.last()
    }

    /// 결과 요약 텍스트.
    pub fn summary(&self) -> String {
        let (value, invested, gain, roi) = match self.final_summary() {
            Some(s) => (
                s.portfolio_value.round_money(2).to_string(),
                s.cumulative_invested.round_money(2).to_string(),
                s.gain.round_money(2).to_string(),
                format_roi(s),
            ),
            None => ("-".into(), "-".into(), "-".into(), "-".into()),
        };

        format!(
            "적립식 투자 시뮬레이션 결과\n\
             ═══════════════════════════════════════\n\
             전략: {}\n\
             기간: {}\n\
             거래일 수: {}\n\
             매월 적립금: {}\n\
             ───────────────────────────────────────\n\
             매월 매수: {}\n\
             하락 매수: {}\n\
             무시된 하락 신호: {}\n\
             ───────────────────────────────────────\n\
             최종 평가액: {}\n\
             누적 투자금: {}\n\
             평가 이익: {}\n\
             수익률: {}\n\
             ═══════════════════════════════════════",
            self.strategy.label(),
            self.horizon,
            self.records.len(),
            self.monthly_savings,
            self.stats.monthly_buys,
            self.stats.drawdown_buys,
            self.stats.suppressed_triggers,
            value,
            invested,
            gain,
            roi,
        )
    }

    /// 연도별 성과 표.
    pub fn yearly_table(&self) -> String {
        let mut out = format!(
            "{:>6}  {:>16}  {:>16}  {:>16}  {:>9}\n",
            "연도", "평가액", "누적 투자금", "평가 이익", "수익률"
        );
        for s in &self.summaries {
            out.push_str(&format!(
                "{:>6}  {:>16}  {:>16}  {:>16}  {:>9}\n",
                s.year,
                s.portfolio_value.round_money(2),
                s.cumulative_invested.round_money(2),
                s.gain.round_money(2),
                format_roi(s),
            ));
        }
        out
    }
}

fn format_roi(summary: &YearlySummary) -> String {
    summary
        .roi
        .map(|r| r.to_percentage_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// 여러 전략의 최종 성과 비교 표.
pub fn comparison_table(reports: &[PlanReport]) -> String {
    let mut out = format!(
        "{:<26}  {:>16}  {:>16}  {:>9}  {:>6}\n",
        "전략", "최종 평가액", "누적 투자금", "수익률", "매수"
    );
    for report in reports {
        let Some(last) = report.final_summary() else {
            continue;
        };
        out.push_str(&format!(
            "{:<26}  {:>16}  {:>16}  {:>9}  {:>6}\n",
            report.strategy.label(),
            last.portfolio_value.round_money(2),
            last.cumulative_invested.round_money(2),
            format_roi(last),
            report.stats.total_buys(),
        ));
    }
    out
}
