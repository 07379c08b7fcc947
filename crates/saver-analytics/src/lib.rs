//! 적립식 투자 전략 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 이동 최고가 대비 하락률 계산
//! - 월별 적립 자본 계산
//! - 전략별 일별 투자 계획 생성 (매월 적립, 하락 매수, 하이브리드)
//! - 연도별 성과 평가와 보고서
//! - 전략 × 시작 연도 병렬 스윕
//!
//! # 예제
//!
//! ```no_run
//! use saver_analytics::{create_investment_plan, PlanRequest, Strategy};
//! use saver_core::{HistoryCatalog, PriceSeries};
//!
//! # fn run(series: PriceSeries) -> saver_core::SaverResult<()> {
//! let bounds = HistoryCatalog::new().bounds_for_series("SPY", &series)?;
//! let request = PlanRequest::new(bounds, Strategy::MonthlyInvest).with_horizon_years(10);
//! let plan = create_investment_plan(&series, &request)?;
//! for summary in plan.summaries() {
//!     println!("{} {:?}", summary.year, summary.roi);
//! }
//! # Ok(())
//! # }
//! ```

pub mod capital;
pub mod charts;
pub mod drawdown;
pub mod performance;
pub mod pipeline;
pub mod planner;
pub mod sweep;

pub use capital::{accrue_capital, month_start_flags};
pub use charts::{yearly_axis_ticks, ChartPoint, YearlyValueChart};
pub use drawdown::{annotate, percent_drop, DrawdownAnnotator, WarmupPolicy, DEFAULT_WINDOW_SIZE};
pub use performance::{comparison_table, evaluate, roi_for, PlanReport};
pub use pipeline::{create_investment_plan, AnnotatedHistory, InvestmentPlan, PlanRequest};
pub use planner::{DropRule, InvestmentPlanner, PlanStats, Strategy, StrategyKind};
pub use sweep::{run_sweep, run_sweep_with_progress, SweepOutcome, SweepRequest};
