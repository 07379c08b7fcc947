//! 단일 전략 실행 파이프라인.
//!
//! 하락률 주석 → 기간 선택 → 구간 추출 → 자본 적립 → 투자 계획 순으로 실행합니다.
//!
//! 이동 최고가는 전체 시계열에서 한 번 계산하므로, 기간 첫 거래일도 기간 이전
//! 가격을 포함한 후행 윈도우를 봅니다. 윈도우 채움 이전 구간은 시계열 맨 앞에만
//! 존재합니다.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use saver_core::{
    select_horizon, Amount, AnnotatedRecord, AppConfig, HistoryBounds, Horizon, PlanRecord,
    PriceSeries, SaverError, SaverResult, YearlySummary,
};

use crate::capital::accrue_capital;
use crate::charts::yearly_axis_ticks;
use crate::drawdown::{DrawdownAnnotator, WarmupPolicy, DEFAULT_WINDOW_SIZE};
use crate::performance::evaluate;
use crate::planner::{InvestmentPlanner, PlanStats, Strategy};

/// 단일 실행 요청.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    /// 선택 가능한 데이터 범위
    pub bounds: HistoryBounds,
    /// 데이터 시작일로부터의 시작 연도 오프셋
    pub year_offset: i32,
    /// 기간 길이 (년)
    pub horizon_years: i32,
    /// 매월 적립 금액
    pub monthly_savings: Amount,
    /// 이동 최고가 윈도우 (거래일)
    pub window_size: usize,
    /// 윈도우 채움 이전 구간 처리 방식
    pub warmup: WarmupPolicy,
    /// 투자 전략
    pub strategy: Strategy,
}

impl PlanRequest {
    /// 기본 설정(20년, 매월 1000, 125일 윈도우)으로 요청을 생성합니다.
    pub fn new(bounds: HistoryBounds, strategy: Strategy) -> Self {
        Self {
            bounds,
            year_offset: 0,
            horizon_years: 20,
            monthly_savings: Decimal::new(1000, 0),
            window_size: DEFAULT_WINDOW_SIZE,
            warmup: WarmupPolicy::default(),
            strategy,
        }
    }

    /// 설정 파일 값으로 요청을 생성합니다.
    pub fn from_config(config: &AppConfig, bounds: HistoryBounds) -> SaverResult<Self> {
        Ok(Self {
            bounds,
            year_offset: 0,
            horizon_years: config.simulation.horizon_years,
            monthly_savings: config.simulation.monthly_savings,
            window_size: config.simulation.window_size,
            warmup: config.simulation.warmup.parse()?,
            strategy: Strategy::from_params(&config.strategy)?,
        })
    }

    pub fn with_year_offset(mut self, year_offset: i32) -> Self {
        self.year_offset = year_offset;
        self
    }

    pub fn with_horizon_years(mut self, horizon_years: i32) -> Self {
        self.horizon_years = horizon_years;
        self
    }

    pub fn with_monthly_savings(mut self, monthly_savings: Amount) -> Self {
        self.monthly_savings = monthly_savings;
        self
    }

    pub fn with_window(mut self, window_size: usize, warmup: WarmupPolicy) -> Self {
        self.window_size = window_size;
        self.warmup = warmup;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }
}

/// 단일 실행 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentPlan {
    /// 선택된 기간
    pub horizon: Horizon,
    /// 사용된 전략
    pub strategy: Strategy,
    /// 매월 적립 금액
    pub monthly_savings: Amount,
    /// 일별 계획
    pub records: Vec<PlanRecord>,
    /// 매수 통계
    pub stats: PlanStats,
}

impl InvestmentPlan {
    /// 연도별 성과.
    pub fn summaries(&self) -> Vec<YearlySummary> {
        evaluate(&self.records)
    }

    /// 마지막 연도의 성과.
    pub fn final_summary(&self) -> Option<YearlySummary> {
        self.summaries().pop()
    }

    /// 연도별 차트 눈금.
    pub fn axis_ticks(&self) -> Vec<NaiveDate> {
        yearly_axis_ticks(&self.records)
    }

    /// 총 투자 금액.
    pub fn total_invested(&self) -> Amount {
        self.records.iter().map(|r| r.investment_amount).sum()
    }
}

/// 전체 시계열에 하락률을 주석한 결과.
///
/// 같은 시계열과 윈도우 설정으로 여러 기간/전략을 실행할 때 공유합니다.
#[derive(Debug, Clone)]
pub struct AnnotatedHistory {
    records: Vec<AnnotatedRecord>,
    window_size: usize,
    warmup: WarmupPolicy,
}

impl AnnotatedHistory {
    /// 시계열 전체에 이동 최고가와 하락률을 계산합니다.
    pub fn new(series: &PriceSeries, window_size: usize, warmup: WarmupPolicy) -> SaverResult<Self> {
        let annotator = DrawdownAnnotator::new(window_size)?.with_warmup(warmup);
        Ok(Self {
            records: annotator.annotate(series.records()),
            window_size,
            warmup,
        })
    }

    /// 요청의 윈도우 설정으로 주석합니다.
    pub fn for_request(series: &PriceSeries, request: &PlanRequest) -> SaverResult<Self> {
        Self::new(series, request.window_size, request.warmup)
    }

    pub fn records(&self) -> &[AnnotatedRecord] {
        &self.records
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn warmup(&self) -> WarmupPolicy {
        self.warmup
    }

    /// 기간에 속하는 주석 레코드 (양 끝 포함).
    pub fn slice(&self, horizon: &Horizon) -> &[AnnotatedRecord] {
        let from = self
            .records
            .partition_point(|r| r.daily.date < horizon.start);
        let to = self
            .records
            .partition_point(|r| r.daily.date <= horizon.end);
        &self.records[from..to.max(from)]
    }

    /// 요청에 따라 투자 계획을 생성합니다.
    ///
    /// 요청의 윈도우 설정은 이 주석 결과를 만든 설정과 같아야 합니다.
    pub fn plan(&self, request: &PlanRequest) -> SaverResult<InvestmentPlan> {
        if request.window_size != self.window_size || request.warmup != self.warmup {
            return Err(SaverError::InvalidParameter(format!(
                "요청의 윈도우 설정({}, {})이 주석 설정({}, {})과 다릅니다",
                request.window_size,
                request.warmup.as_str(),
                self.window_size,
                self.warmup.as_str()
            )));
        }

        let planner = InvestmentPlanner::new(request.strategy)?;
        if request.monthly_savings < Decimal::ZERO {
            return Err(SaverError::InvalidParameter(format!(
                "monthly_savings는 음수일 수 없습니다: {}",
                request.monthly_savings
            )));
        }

        let horizon = select_horizon(request.bounds, request.year_offset, request.horizon_years)?;
        let slice = self.slice(&horizon);
        if slice.is_empty() {
            return Err(SaverError::Data(format!(
                "기간 {} 안에 가격 데이터가 없습니다",
                horizon
            )));
        }

        let capitalized = accrue_capital(slice.to_vec(), request.monthly_savings)?;
        let (records, stats) = planner.plan(capitalized)?;

        info!(
            strategy = request.strategy.label(),
            %horizon,
            days = records.len(),
            buys = stats.total_buys(),
            "plan completed"
        );

        Ok(InvestmentPlan {
            horizon,
            strategy: request.strategy,
            monthly_savings: request.monthly_savings,
            records,
            stats,
        })
    }
}

/// 요청에 따라 투자 계획을 생성합니다.
///
/// # 에러
///
/// - 전략, 윈도우, 적립 금액이 잘못되면 `SaverError::InvalidParameter`
/// - 기간이 데이터 범위를 벗어나면 `SaverError::InvalidRange`
/// - 기간 안에 가격 데이터가 없으면 `SaverError::Data`
pub fn create_investment_plan(
    series: &PriceSeries,
    request: &PlanRequest,
) -> SaverResult<InvestmentPlan> {
    // 주석 전에 전략을 먼저 검증
    InvestmentPlanner::new(request.strategy)?;
    AnnotatedHistory::for_request(series, request)?.plan(request)
}
