//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다. 모든 섹션은 기본값을
//! 가지므로 설정 파일 없이도 동작합니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::HistoryCatalog;
use crate::error::SaverResult;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 시뮬레이션 설정
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// 전략 파라미터
    #[serde(default)]
    pub strategy: StrategyParams,
    /// 종목별 데이터 범위
    #[serde(default)]
    pub history: HistoryCatalog,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 시뮬레이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// 매월 적립 금액
    #[serde(default = "default_monthly_savings")]
    pub monthly_savings: Decimal,
    /// 시뮬레이션 기간 (년)
    #[serde(default = "default_horizon_years")]
    pub horizon_years: i32,
    /// 이동 최고가 윈도우 크기 (거래일)
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// 윈도우가 채워지기 전 구간의 처리 방식 (shared_prefix_max, expanding_max)
    #[serde(default = "default_warmup")]
    pub warmup: String,
}

fn default_monthly_savings() -> Decimal {
    Decimal::new(1000, 0)
}
fn default_horizon_years() -> i32 {
    20
}
fn default_window_size() -> usize {
    125
} // 약 6개월
fn default_warmup() -> String {
    "shared_prefix_max".to_string()
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            monthly_savings: default_monthly_savings(),
            horizon_years: default_horizon_years(),
            window_size: default_window_size(),
            warmup: default_warmup(),
        }
    }
}

/// 전략 파라미터 (검증 전 원시 입력).
///
/// `mode`는 `monthly_invest_strategy`, `markettiming_strategy`,
/// `hybrid_strategy` 중 하나입니다. 정수 필드는 부호 있는 타입으로 받아
/// 검증 단계에서 범위를 확인합니다.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StrategyParams {
    /// 전략 모드
    #[serde(default = "default_mode")]
    pub mode: String,
    /// 매월 투자 비율 [0, 1] (hybrid 전략에서만 사용)
    #[serde(default = "default_perc_monthly_invest")]
    pub perc_monthly_invest: Decimal,
    /// 하락률 임계값 [0, 1]
    #[serde(default = "default_perc_drop_threshold")]
    pub perc_drop_threshold: Decimal,
    /// 하락 매수 간 최소 거래일 수 (>= 1)
    #[serde(default = "default_waiting_days")]
    pub waiting_days: i64,
    /// 하락률 배수 (>= 1)
    #[serde(default = "default_drop_multiplier")]
    pub drop_multiplier: i64,
}

fn default_mode() -> String {
    "hybrid_strategy".to_string()
}
fn default_perc_monthly_invest() -> Decimal {
    Decimal::new(9, 1)
} // 90%
fn default_perc_drop_threshold() -> Decimal {
    Decimal::new(35, 3)
} // 3.5%
fn default_waiting_days() -> i64 {
    3
}
fn default_drop_multiplier() -> i64 {
    9
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            perc_monthly_invest: default_perc_monthly_invest(),
            perc_drop_threshold: default_perc_drop_threshold(),
            waiting_days: default_waiting_days(),
            drop_multiplier: default_drop_multiplier(),
        }
    }
}

impl StrategyParams {
    /// 모드만 바꾼 파라미터를 반환합니다.
    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> SaverResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SAVER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 환경 변수만으로 설정을 로드합니다 (파일 없음).
    pub fn load_from_env() -> SaverResult<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("SAVER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }
}
