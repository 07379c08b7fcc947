//! 전략 × 시작 연도 파라미터 스윕.
//!
//! 하락률은 시계열 전체에서 한 번만 계산하고, 각 (전략, year_offset) 조합은
//! 그 결과를 읽기 전용으로 공유하며 독립적으로 실행합니다. 계산은 CPU 작업이므로
//! `spawn_blocking`으로 blocking thread pool에서 돌리고 `JoinSet`으로 모읍니다.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use saver_core::{Horizon, PriceSeries, SaverError, SaverResult, YearlySummary};

use crate::pipeline::{AnnotatedHistory, PlanRequest};
use crate::planner::{PlanStats, Strategy};

/// 스윕 요청.
#[derive(Debug, Clone)]
pub struct SweepRequest {
    /// 기본 요청 (전략과 year_offset은 조합마다 덮어씀)
    pub base: PlanRequest,
    /// 실행할 전략
    pub strategies: Vec<Strategy>,
    /// 실행할 시작 연도 오프셋
    pub year_offsets: Vec<i32>,
}

impl SweepRequest {
    pub fn new(base: PlanRequest, strategies: Vec<Strategy>, year_offsets: Vec<i32>) -> Self {
        Self {
            base,
            strategies,
            year_offsets,
        }
    }

    /// 전체 조합 수.
    pub fn len(&self) -> usize {
        self.strategies.len() * self.year_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn requests(&self) -> impl Iterator<Item = PlanRequest> + '_ {
        self.strategies.iter().flat_map(move |strategy| {
            self.year_offsets.iter().map(move |&offset| {
                self.base
                    .clone()
                    .with_strategy(*strategy)
                    .with_year_offset(offset)
            })
        })
    }
}

/// 스윕 조합 하나의 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    /// 사용된 전략
    pub strategy: Strategy,
    /// 시작 연도 오프셋
    pub year_offset: i32,
    /// 선택된 기간
    pub horizon: Horizon,
    /// 매수 통계
    pub stats: PlanStats,
    /// 마지막 연도 성과
    pub final_summary: Option<YearlySummary>,
}

/// 스윕을 실행합니다.
///
/// 기간이 데이터 범위를 벗어나는 오프셋은 건너뜁니다. 결과는 (전략 이름,
/// year_offset) 순으로 정렬됩니다.
pub async fn run_sweep(series: &PriceSeries, request: SweepRequest) -> SaverResult<Vec<SweepOutcome>> {
    run_sweep_with_progress(series, request, |_, _| {}).await
}

/// 진행 콜백과 함께 스윕을 실행합니다.
///
/// `on_progress(완료 수, 전체 수)`는 조합 하나가 끝날 때마다(건너뛴 경우 포함)
/// 호출됩니다.
pub async fn run_sweep_with_progress<F>(
    series: &PriceSeries,
    request: SweepRequest,
    mut on_progress: F,
) -> SaverResult<Vec<SweepOutcome>>
where
    F: FnMut(usize, usize),
{
    let total = request.len();
    let history = Arc::new(AnnotatedHistory::for_request(series, &request.base)?);
    let mut tasks = JoinSet::new();

    for plan_request in request.requests() {
        let history = Arc::clone(&history);
        tasks.spawn_blocking(move || {
            let result = history.plan(&plan_request);
            (plan_request, result)
        });
    }

    let mut outcomes = Vec::with_capacity(total);
    let mut completed = 0;

    while let Some(joined) = tasks.join_next().await {
        let (plan_request, result) = joined.map_err(task_failure)?;
        completed += 1;
        on_progress(completed, total);

        match result {
            Ok(plan) => outcomes.push(SweepOutcome {
                strategy: plan.strategy,
                year_offset: plan_request.year_offset,
                horizon: plan.horizon,
                stats: plan.stats,
                final_summary: plan.final_summary(),
            }),
            Err(SaverError::InvalidRange(reason)) => {
                debug!(
                    strategy = plan_request.strategy.label(),
                    year_offset = plan_request.year_offset,
                    %reason,
                    "sweep combination skipped"
                );
            }
            Err(e) => return Err(e),
        }
    }

    outcomes.sort_by(|a, b| {
        a.strategy
            .label()
            .cmp(b.strategy.label())
            .then(a.year_offset.cmp(&b.year_offset))
    });

    info!(total, completed = outcomes.len(), "sweep finished");

    Ok(outcomes)
}

/// 작업 실패를 처리합니다. 패닉은 호출자에게 그대로 전파합니다.
fn task_failure(err: JoinError) -> SaverError {
    if err.is_panic() {
        std::panic::resume_unwind(err.into_panic());
    }
    SaverError::Internal(format!("스윕 작업이 취소되었습니다: {}", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cancelled_task_is_internal_error() {
        let mut tasks = JoinSet::new();
        tasks.spawn(std::future::pending::<()>());
        tasks.abort_all();

        let err = tasks.join_next().await.unwrap().unwrap_err();
        assert!(matches!(task_failure(err), SaverError::Internal(_)));
    }

    #[tokio::test]
    #[should_panic(expected = "worker failed")]
    async fn test_worker_panic_is_propagated() {
        let mut tasks = JoinSet::new();
        tasks.spawn_blocking(|| panic!("worker failed"));

        let err = tasks.join_next().await.unwrap().unwrap_err();
        let _ = task_failure(err);
    }
}
