//! 적립식 투자 백테스트의 에러 타입.
//!
//! 이 모듈은 시뮬레이션 파이프라인 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 백테스트 에러.
#[derive(Debug, Error)]
pub enum SaverError {
    /// 잘못된 전략/시뮬레이션 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 사용 가능한 데이터를 벗어난 기간
    #[error("잘못된 기간: {0}")]
    InvalidRange(String),

    /// 누적 투자금이 0이라 ROI를 정의할 수 없음
    #[error("ROI 계산 불가: {year}년 누적 투자금이 0입니다")]
    DivisionUndefined { year: i32 },

    /// 가격 데이터 에러
    #[error("데이터 에러: {0}")]
    Data(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 내부 에러 (작업 취소 등)
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 백테스트 작업을 위한 Result 타입.
pub type SaverResult<T> = Result<T, SaverError>;

impl SaverError {
    /// 호출자가 입력값을 고쳐 다시 실행해야 하는 검증 에러인지 확인합니다.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SaverError::InvalidParameter(_) | SaverError::InvalidRange(_)
        )
    }
}

impl From<config::ConfigError> for SaverError {
    fn from(err: config::ConfigError) -> Self {
        SaverError::Config(err.to_string())
    }
}

impl From<chrono::ParseError> for SaverError {
    fn from(err: chrono::ParseError) -> Self {
        SaverError::Data(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_validation() {
        let param_err = SaverError::InvalidParameter("waiting_days = 0".to_string());
        assert!(param_err.is_validation());

        let range_err = SaverError::InvalidRange("horizon".to_string());
        assert!(range_err.is_validation());

        let div_err = SaverError::DivisionUndefined { year: 2001 };
        assert!(!div_err.is_validation());

        let internal = SaverError::Internal("cancelled".to_string());
        assert!(!internal.is_validation());
    }

    #[test]
    fn test_error_message_names_year() {
        let err = SaverError::DivisionUndefined { year: 1999 };
        assert!(err.to_string().contains("1999"));
    }
}
