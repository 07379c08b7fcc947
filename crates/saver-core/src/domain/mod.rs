//! 적립식 투자 백테스트의 도메인 모델.

mod history;
mod horizon;
mod price_series;
mod records;

pub use history::*;
pub use horizon::*;
pub use price_series::*;
pub use records::*;
