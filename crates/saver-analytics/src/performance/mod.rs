//! 성과 평가 모듈.
//!
//! - `evaluator`: 연도별 포트폴리오 가치, 누적 투자금, 평가 이익, 수익률
//! - `report`: 결과 요약 텍스트

mod evaluator;
mod report;

pub use evaluator::*;
pub use report::*;
