//! CLI 명령어 구현 모듈.

pub mod backtest;
pub mod data;
pub mod sweep;
