//! 적립식 투자 백테스트 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 설정 파일 기본값으로 하이브리드 전략 실행
//! saver run -d data/SPY.csv
//!
//! # 매월 적립 전략, 10년, 시작 연도 +3년
//! saver run -d data/SPY.csv --strategy monthly --years 10 --offset 3
//!
//! # 세 전략 비교
//! saver compare -d data/SPY.csv -o results/compare.json
//!
//! # 시작 연도 스윕
//! saver sweep -d data/SPY.csv --years 20
//!
//! # 전략 목록 / 적용된 설정 보기
//! saver strategies
//! saver --config config/default.toml config
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::info;

use saver_analytics::comparison_table;
use saver_cli::commands::backtest::{print_available_strategies, run_compare, run_plan, RunOptions};
use saver_cli::commands::sweep::{run_sweep_command, sweep_table};
use saver_core::{init_logging, AppConfig, LogConfig};

#[derive(Parser)]
#[command(name = "saver")]
#[command(about = "Savings strategy backtester - 매월 적립 vs 하락 매수 전략 비교", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (TOML). 없으면 기본값과 SAVER__ 환경 변수를 사용
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// 실행 공통 인자.
#[derive(clap::Args, Debug, Clone)]
struct RunArgs {
    /// 가격 데이터 CSV (Yahoo Finance 형식)
    #[arg(short, long)]
    data: PathBuf,

    /// 종목 식별자 (기본: 파일 이름)
    #[arg(short, long)]
    instrument: Option<String>,

    /// 시작 연도 오프셋 (데이터 시작일 기준)
    #[arg(long, default_value = "0")]
    offset: i32,

    /// 시뮬레이션 기간 (년)
    #[arg(short, long)]
    years: Option<i32>,

    /// 매월 적립 금액
    #[arg(long)]
    savings: Option<String>,

    /// 결과 저장 경로 (.json, .csv, 그 외 텍스트)
    #[arg(short, long)]
    output: Option<String>,
}

impl RunArgs {
    fn into_options(self, strategy: Option<String>) -> Result<RunOptions> {
        let monthly_savings = self
            .savings
            .map(|s| {
                s.parse::<Decimal>()
                    .map_err(|e| anyhow!("잘못된 적립 금액: {} ({})", s, e))
            })
            .transpose()?;

        Ok(RunOptions {
            data_path: self.data,
            instrument: self.instrument,
            year_offset: self.offset,
            horizon_years: self.years,
            monthly_savings,
            strategy,
            output_path: self.output,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 전략 시뮬레이션
    Run {
        #[command(flatten)]
        args: RunArgs,

        /// 전략 (monthly_invest_strategy, markettiming_strategy, hybrid_strategy)
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// 세 전략을 같은 조건으로 비교
    Compare {
        #[command(flatten)]
        args: RunArgs,
    },

    /// 시작 연도 오프셋별 병렬 스윕
    Sweep {
        #[command(flatten)]
        args: RunArgs,

        /// 최대 오프셋 (기본: 데이터 범위에서 가능한 최댓값)
        #[arg(long)]
        max_offset: Option<i32>,
    },

    /// 사용 가능한 전략 목록 보기
    Strategies,

    /// 적용된 설정을 TOML로 출력
    Config,
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("설정 파일을 읽을 수 없습니다: {}", path)),
        None => AppConfig::load_from_env().context("환경 변수 설정을 읽을 수 없습니다"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Run { args, strategy } => {
            let options = args.into_options(strategy)?;
            let report = run_plan(&config, &options)?;

            info!("✅ 시뮬레이션 완료: {}", report.strategy.label());
            println!("\n{}", report.summary());
            println!("\n{}", report.yearly_table());
        }

        Commands::Compare { args } => {
            let options = args.into_options(None)?;
            let reports = run_compare(&config, &options)?;

            info!("✅ {}개 전략 비교 완료", reports.len());
            for report in &reports {
                println!("\n{}", report.summary());
            }
            println!("\n{}", comparison_table(&reports));
        }

        Commands::Sweep { args, max_offset } => {
            let options = args.into_options(None)?;
            let outcomes = run_sweep_command(&config, &options, max_offset).await?;

            info!("✅ 스윕 완료: {}개 조합", outcomes.len());
            println!("\n{}", sweep_table(&outcomes));
        }

        Commands::Strategies => {
            print_available_strategies();
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
