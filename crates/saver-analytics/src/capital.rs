//! 월별 적립 자본 계산.
//!
//! 각 (연, 월) 그룹의 첫 거래일에 `monthly_savings`만큼 적립하고, 그 누적 합을
//! 같은 달의 나머지 거래일에 이어서 채웁니다.

use rust_decimal::Decimal;
use tracing::debug;

use saver_core::{Amount, AnnotatedRecord, CapitalizedRecord, DailyRecord, SaverError, SaverResult};

/// 각 레코드가 해당 (연, 월)의 첫 거래일인지 표시합니다.
///
/// 레코드는 날짜 오름차순이어야 합니다.
pub fn month_start_flags<'a, I>(records: I) -> Vec<bool>
where
    I: IntoIterator<Item = &'a DailyRecord>,
{
    let mut previous: Option<(i32, u32)> = None;
    records
        .into_iter()
        .map(|record| {
            let key = record.month_key();
            let is_start = previous != Some(key);
            previous = Some(key);
            is_start
        })
        .collect()
}

/// 레코드에 누적 가용 자본을 추가합니다.
///
/// # 에러
///
/// `monthly_savings`가 음수이면 `SaverError::InvalidParameter`를 반환합니다.
pub fn accrue_capital(
    records: Vec<AnnotatedRecord>,
    monthly_savings: Amount,
) -> SaverResult<Vec<CapitalizedRecord>> {
    if monthly_savings < Decimal::ZERO {
        return Err(SaverError::InvalidParameter(format!(
            "monthly_savings는 음수일 수 없습니다: {}",
            monthly_savings
        )));
    }

    let flags = month_start_flags(records.iter().map(|r| &r.daily));
    let mut accrued: Option<Amount> = None;

    let capitalized: Vec<CapitalizedRecord> = records
        .into_iter()
        .zip(flags)
        .map(|(annotated, is_month_start)| {
            if is_month_start {
                accrued = Some(accrued.unwrap_or(Decimal::ZERO) + monthly_savings);
            }
            CapitalizedRecord {
                annotated,
                available_capital: accrued,
            }
        })
        .collect();

    debug!(
        records = capitalized.len(),
        total = %accrued.unwrap_or(Decimal::ZERO),
        "capital accrued"
    );

    Ok(capitalized)
}
