//! 금융 계산을 위한 Decimal 유틸리티.
//!
//! 가격, 금액, 비율을 모두 정밀 소수점으로 다룹니다.

use rust_decimal::Decimal;

/// 가격 타입 (시가, 고가, 수정 종가).
pub type Price = Decimal;

/// 현금/투자 금액 타입.
pub type Amount = Decimal;

/// 비율 타입 (0.01 = 1%).
pub type Percentage = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percentage_string(&self) -> String;

    /// [0, 1] 구간에 포함되는지 확인합니다.
    fn is_unit_interval(&self) -> bool;

    /// 지정된 소수점 자릿수로 반올림합니다.
    fn round_money(&self, dp: u32) -> Decimal;
}

impl DecimalExt for Decimal {
    fn to_percentage_string(&self) -> String {
        let pct = *self * Decimal::from(100);
        format!("{:.2}%", pct)
    }

    fn is_unit_interval(&self) -> bool {
        *self >= Decimal::ZERO && *self <= Decimal::ONE
    }

    fn round_money(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_ext() {
        assert_eq!(dec!(0.0525).to_percentage_string(), "5.25%");
        assert_eq!(dec!(1.23456).round_money(2), dec!(1.23));
    }

    #[test]
    fn test_unit_interval() {
        assert!(dec!(0).is_unit_interval());
        assert!(dec!(1).is_unit_interval());
        assert!(dec!(0.035).is_unit_interval());
        assert!(!dec!(1.01).is_unit_interval());
        assert!(!dec!(-0.1).is_unit_interval());
    }
}
