//! 전략 실행 명령어.
//!
//! CSV 가격 데이터로 적립식 투자 전략을 시뮬레이션합니다.
//!
//! # 사용 예시
//!
//! ```bash
//! # SPY 데이터로 하이브리드 전략 실행 (설정 파일 기본값)
//! saver run -d data/SPY.csv
//!
//! # 시작 연도를 5년 뒤로 옮겨 10년간 매월 적립 전략 실행
//! saver run -d data/SPY.csv --strategy monthly --offset 5 --years 10
//!
//! # 결과를 JSON으로 저장
//! saver run -d data/SPY.csv -o results/spy.json
//!
//! # 세 전략 비교
//! saver compare -d data/SPY.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use saver_analytics::{
    comparison_table, create_investment_plan, PlanReport, PlanRequest, Strategy, StrategyKind,
};
use saver_core::{AppConfig, BuySource, PlanRecord, PriceSeries};

use crate::commands::data::{instrument_from_path, load_price_csv};

/// 실행 명령어 옵션.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 가격 데이터 CSV 경로
    pub data_path: PathBuf,
    /// 종목 식별자 (없으면 파일 이름에서 추정)
    pub instrument: Option<String>,
    /// 시작 연도 오프셋
    pub year_offset: i32,
    /// 기간 (년), 없으면 설정값
    pub horizon_years: Option<i32>,
    /// 매월 적립 금액, 없으면 설정값
    pub monthly_savings: Option<Decimal>,
    /// 전략 모드, 없으면 설정값
    pub strategy: Option<String>,
    /// 결과 저장 경로
    pub output_path: Option<String>,
}

impl RunOptions {
    /// 종목 식별자를 결정합니다.
    pub fn instrument(&self) -> Result<String> {
        self.instrument
            .clone()
            .or_else(|| instrument_from_path(&self.data_path))
            .ok_or_else(|| anyhow!("종목을 지정해 주세요 (--instrument)"))
    }
}

/// 설정과 옵션으로 기본 실행 요청을 만듭니다.
pub fn build_request(
    config: &AppConfig,
    series: &PriceSeries,
    options: &RunOptions,
) -> Result<PlanRequest> {
    let mut config = config.clone();
    if let Some(mode) = &options.strategy {
        config.strategy.mode = mode.clone();
    }
    if let Some(years) = options.horizon_years {
        config.simulation.horizon_years = years;
    }
    if let Some(savings) = options.monthly_savings {
        config.simulation.monthly_savings = savings;
    }

    let instrument = options.instrument()?;
    let bounds = config.history.bounds_for_series(&instrument, series)?;
    info!(%instrument, start = %bounds.start, end = %bounds.end, "데이터 범위");

    Ok(PlanRequest::from_config(&config, bounds)?.with_year_offset(options.year_offset))
}

/// 단일 전략을 실행합니다.
pub fn run_plan(config: &AppConfig, options: &RunOptions) -> Result<PlanReport> {
    let series = load_price_csv(&options.data_path)?;
    let request = build_request(config, &series, options)?;
    let plan = create_investment_plan(&series, &request)
        .with_context(|| format!("{} 전략 실행 실패", request.strategy.label()))?;

    let report = PlanReport::from(plan);
    if let Some(path) = &options.output_path {
        save_report(&report, path)?;
        info!("결과 저장: {}", path);
    }

    Ok(report)
}

/// 같은 설정으로 세 전략을 모두 실행합니다.
pub fn run_compare(config: &AppConfig, options: &RunOptions) -> Result<Vec<PlanReport>> {
    let series = load_price_csv(&options.data_path)?;
    let request = build_request(config, &series, options)?;
    let strategies = Strategy::all_from_params(&config.strategy)?;

    let reports = strategies
        .into_iter()
        .map(|strategy| {
            let plan = create_investment_plan(&series, &request.clone().with_strategy(strategy))
                .with_context(|| format!("{} 전략 실행 실패", strategy.label()))?;
            Ok(PlanReport::from(plan))
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(path) = &options.output_path {
        save_comparison(&reports, path)?;
        info!("비교 결과 저장: {}", path);
    }

    Ok(reports)
}

/// CSV 내보내기용 평탄화된 계획 행.
#[derive(Debug, Serialize)]
struct PlanRow {
    date: NaiveDate,
    open: Decimal,
    high: Decimal,
    adjusted_close: Decimal,
    moving_max: Decimal,
    percent_drop: Option<Decimal>,
    available_capital: Option<Decimal>,
    buy: bool,
    investment_percent: Decimal,
    investment_amount: Decimal,
    cash: Option<Decimal>,
    share_amount: Decimal,
    source: Option<BuySource>,
}

impl From<&PlanRecord> for PlanRow {
    fn from(record: &PlanRecord) -> Self {
        let daily = record.daily();
        Self {
            date: daily.date,
            open: daily.open,
            high: daily.high,
            adjusted_close: daily.adjusted_close,
            moving_max: record.capitalized.annotated.moving_max,
            percent_drop: record.percent_drop(),
            available_capital: record.available_capital(),
            buy: record.buy,
            investment_percent: record.investment_percent,
            investment_amount: record.investment_amount,
            cash: record.cash,
            share_amount: record.share_amount,
            source: record.source,
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("디렉토리를 만들 수 없습니다: {}", parent.display()))?;
    }
    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}

/// 일별 계획을 CSV로 씁니다.
pub fn write_plan_csv(records: &[PlanRecord], path: impl AsRef<Path>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path.as_ref()).context("CSV 파일을 만들 수 없습니다")?;
    for record in records {
        wtr.serialize(PlanRow::from(record))
            .context("CSV 행을 쓸 수 없습니다")?;
    }
    wtr.flush()?;
    Ok(())
}

/// 보고서를 저장합니다.
///
/// `.json`은 전체 보고서, `.csv`는 일별 계획, 그 외에는 텍스트 요약입니다.
pub fn save_report(report: &PlanReport, path: &str) -> Result<()> {
    let path = Path::new(path);
    ensure_parent(path)?;

    if has_extension(path, "json") {
        std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    } else if has_extension(path, "csv") {
        write_plan_csv(&report.records, path)?;
    } else {
        std::fs::write(
            path,
            format!("{}\n\n{}", report.summary(), report.yearly_table()),
        )?;
    }
    Ok(())
}

/// 비교 결과를 저장합니다 (`.json`은 전체 보고서 목록, 그 외에는 비교 표).
pub fn save_comparison(reports: &[PlanReport], path: &str) -> Result<()> {
    let path = Path::new(path);
    ensure_parent(path)?;

    let content = if has_extension(path, "json") {
        serde_json::to_string_pretty(reports)?
    } else {
        comparison_table(reports)
    };
    std::fs::write(path, content)?;
    Ok(())
}

/// 사용 가능한 전략 목록 출력
pub fn print_available_strategies() {
    println!("\n📋 사용 가능한 전략 목록:");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    for kind in StrategyKind::all() {
        println!("  {:<26} | {}", kind.as_str(), kind.description());
    }
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("예시 설정 파일 (config/default.toml):");
    println!("  [simulation]");
    println!("  monthly_savings = 1000");
    println!("  horizon_years = 20");
    println!("  ");
    println!("  [strategy]");
    println!("  mode = \"hybrid_strategy\"");
    println!("  perc_monthly_invest = 0.9");
    println!("  perc_drop_threshold = 0.035");
    println!("  waiting_days = 3");
    println!("  drop_multiplier = 9");
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use saver_core::{DailyRecord, HistoryCatalog};

    fn series() -> PriceSeries {
        PriceSeries::new(vec![
            DailyRecord::new(
                NaiveDate::from_ymd_opt(2000, 1, 3).unwrap(),
                dec!(10),
                dec!(10),
                dec!(10),
            ),
            DailyRecord::new(
                NaiveDate::from_ymd_opt(2003, 1, 3).unwrap(),
                dec!(10),
                dec!(10),
                dec!(10),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_request_applies_overrides() {
        let mut config = AppConfig::default();
        config.history = HistoryCatalog::new().with_entry("SPY", "2000-01-03");
        let options = RunOptions {
            data_path: PathBuf::from("data/SPY.csv"),
            year_offset: 1,
            horizon_years: Some(2),
            monthly_savings: Some(dec!(300)),
            strategy: Some("monthly".to_string()),
            ..Default::default()
        };

        let request = build_request(&config, &series(), &options).unwrap();
        assert_eq!(request.year_offset, 1);
        assert_eq!(request.horizon_years, 2);
        assert_eq!(request.monthly_savings, dec!(300));
        assert_eq!(request.strategy, Strategy::MonthlyInvest);
        assert_eq!(request.bounds.end, NaiveDate::from_ymd_opt(2003, 1, 3).unwrap());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let options = RunOptions {
            data_path: PathBuf::from("SPY.csv"),
            strategy: Some("lump_sum".to_string()),
            ..Default::default()
        };
        assert!(build_request(&AppConfig::default(), &series(), &options).is_err());
    }

    #[test]
    fn test_extension_check() {
        assert!(has_extension(Path::new("out/report.JSON"), "json"));
        assert!(!has_extension(Path::new("out/report.txt"), "json"));
        assert!(!has_extension(Path::new("out/report"), "csv"));
    }
}
