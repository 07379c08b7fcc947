//! 투자 전략과 일별 투자 계획 생성.
//!
//! - `strategy`: 전략 종류와 하락 매수 규칙, 파라미터 검증
//! - `engine`: 자본이 적립된 레코드를 접어 일별 매수 계획을 만드는 생성기

mod engine;
mod strategy;

pub use engine::*;
pub use strategy::*;
