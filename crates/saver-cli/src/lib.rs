//! 적립식 투자 백테스트 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - CSV 가격 데이터 로더
//! - 단일 전략 실행과 전략 비교
//! - 시작 연도 스윕
//! - 보고서 내보내기 (JSON, CSV, 텍스트)

pub mod commands;

pub use commands::*;
