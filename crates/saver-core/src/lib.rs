//! # Saver Core
//!
//! 적립식 투자 전략 백테스트의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시뮬레이션 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일별 가격 시계열과 단계별 레코드
//! - 시뮬레이션 기간 선택
//! - 종목별 데이터 범위 카탈로그
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
