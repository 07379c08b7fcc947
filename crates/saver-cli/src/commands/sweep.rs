//! 시작 연도 스윕 명령어.
//!
//! 세 전략을 가능한 모든 시작 연도 오프셋에 대해 병렬로 실행하고 최종 수익률을
//! 표로 보여줍니다.
//!
//! ```bash
//! saver sweep -d data/SPY.csv --years 20 --max-offset 10
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use saver_analytics::{run_sweep_with_progress, Strategy, SweepOutcome, SweepRequest};
use saver_core::{AppConfig, DecimalExt};

use crate::commands::backtest::{build_request, RunOptions};
use crate::commands::data::load_price_csv;

/// 스윕을 실행합니다.
///
/// `max_offset`이 없으면 데이터 범위 안에서 가능한 모든 오프셋을 시도합니다.
pub async fn run_sweep_command(
    config: &AppConfig,
    options: &RunOptions,
    max_offset: Option<i32>,
) -> Result<Vec<SweepOutcome>> {
    let series = load_price_csv(&options.data_path)?;
    let base = build_request(config, &series, options)?;
    let strategies = Strategy::all_from_params(&config.strategy)?;

    let span_years = base.bounds.end.years_since(base.bounds.start).unwrap_or(0) as i32;
    let last_offset = max_offset.unwrap_or(span_years - base.horizon_years).max(0);
    let offsets: Vec<i32> = (0..=last_offset).collect();

    let request = SweepRequest::new(base, strategies, offsets);
    info!(combinations = request.len(), "스윕 시작");

    let pb = ProgressBar::new(request.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )?
            .progress_chars("#>-"),
    );

    let outcomes = run_sweep_with_progress(&series, request, |done, _| pb.set_position(done as u64))
        .await
        .context("스윕 실행 실패")?;

    pb.finish_with_message("스윕 완료");

    if let Some(path) = &options.output_path {
        save_outcomes(&outcomes, path)?;
        info!("스윕 결과 저장: {}", path);
    }

    Ok(outcomes)
}

/// 스윕 결과 표.
pub fn sweep_table(outcomes: &[SweepOutcome]) -> String {
    let mut out = format!(
        "{:<26}  {:>6}  {:>23}  {:>16}  {:>9}\n",
        "전략", "오프셋", "기간", "최종 평가액", "수익률"
    );
    for outcome in outcomes {
        let (value, roi) = match &outcome.final_summary {
            Some(s) => (
                s.portfolio_value.round_money(2).to_string(),
                s.roi
                    .map(|r| r.to_percentage_string())
                    .unwrap_or_else(|| "N/A".to_string()),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        out.push_str(&format!(
            "{:<26}  {:>6}  {:>23}  {:>16}  {:>9}\n",
            outcome.strategy.label(),
            outcome.year_offset,
            outcome.horizon.to_string(),
            value,
            roi,
        ));
    }
    out
}

fn save_outcomes(outcomes: &[SweepOutcome], path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let content = if path.extension().map_or(false, |ext| ext == "json") {
        serde_json::to_string_pretty(outcomes)?
    } else {
        sweep_table(outcomes)
    };
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use saver_analytics::{DropRule, PlanStats};
    use saver_core::{Horizon, YearlySummary};

    #[test]
    fn test_sweep_table_rows() {
        let date = |y| NaiveDate::from_ymd_opt(y, 1, 4).unwrap();
        let outcomes = vec![
            SweepOutcome {
                strategy: Strategy::MarketTiming(DropRule::default()),
                year_offset: 0,
                horizon: Horizon {
                    start: date(2000),
                    end: date(2010),
                },
                stats: PlanStats::default(),
                final_summary: Some(YearlySummary {
                    year: 2010,
                    portfolio_value: dec!(150000),
                    cumulative_invested: dec!(120000),
                    gain: dec!(30000),
                    roi: Some(dec!(0.25)),
                }),
            },
            SweepOutcome {
                strategy: Strategy::MonthlyInvest,
                year_offset: 1,
                horizon: Horizon {
                    start: date(2001),
                    end: date(2011),
                },
                stats: PlanStats::default(),
                final_summary: None,
            },
        ];

        let table = sweep_table(&outcomes);
        assert_eq!(table.lines().count(), 3);
        assert!(table.contains("markettiming_strategy"));
        assert!(table.contains("25.00%"));
    }
}
