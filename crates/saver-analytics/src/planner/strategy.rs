//! 투자 전략 정의와 파라미터 검증.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use saver_core::{DecimalExt, Percentage, SaverError, SaverResult, StrategyParams};

/// 전략 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 매월 적립금 전액 투자
    MonthlyInvest,
    /// 하락 시에만 투자
    MarketTiming,
    /// 매월 일부 투자 + 하락 시 추가 투자
    Hybrid,
}

impl StrategyKind {
    /// 설정 파일에서 사용하는 모드 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::MonthlyInvest => "monthly_invest_strategy",
            StrategyKind::MarketTiming => "markettiming_strategy",
            StrategyKind::Hybrid => "hybrid_strategy",
        }
    }

    /// 모든 전략 종류.
    pub fn all() -> [StrategyKind; 3] {
        [
            StrategyKind::MonthlyInvest,
            StrategyKind::MarketTiming,
            StrategyKind::Hybrid,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::MonthlyInvest => "매월 첫 거래일에 적립금 전액을 투자합니다",
            StrategyKind::MarketTiming => {
                "이동 최고가 대비 하락률이 임계값을 넘은 다음 날 가용 현금 일부를 투자합니다"
            }
            StrategyKind::Hybrid => {
                "매월 적립금의 일정 비율을 투자하고, 남은 현금으로 하락 매수를 병행합니다"
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = SaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly_invest_strategy" | "monthly" => Ok(Self::MonthlyInvest),
            "markettiming_strategy" | "market_timing" | "markettiming" => Ok(Self::MarketTiming),
            "hybrid_strategy" | "hybrid" => Ok(Self::Hybrid),
            _ => Err(SaverError::InvalidParameter(format!(
                "알 수 없는 전략 모드: {} (monthly_invest_strategy, markettiming_strategy, hybrid_strategy 중 하나)",
                s
            ))),
        }
    }
}

/// 하락 매수 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropRule {
    /// 매수를 발생시키는 최소 하락률 [0, 1]
    pub threshold: Percentage,
    /// 하락 매수 간 최소 거래일 간격
    pub waiting_days: usize,
    /// 투자 비율 = min(1, 하락률 × multiplier)
    pub multiplier: u32,
}

impl DropRule {
    /// 검증된 하락 매수 규칙을 생성합니다.
    pub fn new(threshold: Percentage, waiting_days: i64, multiplier: i64) -> SaverResult<Self> {
        if !threshold.is_unit_interval() {
            return Err(SaverError::InvalidParameter(format!(
                "perc_drop_threshold는 0과 1 사이여야 합니다: {}",
                threshold
            )));
        }
        if waiting_days < 1 {
            return Err(SaverError::InvalidParameter(format!(
                "waiting_days는 1 이상이어야 합니다: {}",
                waiting_days
            )));
        }
        if multiplier < 1 {
            return Err(SaverError::InvalidParameter(format!(
                "drop_multiplier는 1 이상이어야 합니다: {}",
                multiplier
            )));
        }

        let waiting_days = usize::try_from(waiting_days).map_err(|_| {
            SaverError::InvalidParameter(format!("waiting_days가 너무 큽니다: {}", waiting_days))
        })?;
        let multiplier = u32::try_from(multiplier).map_err(|_| {
            SaverError::InvalidParameter(format!("drop_multiplier가 너무 큽니다: {}", multiplier))
        })?;

        Ok(Self {
            threshold,
            waiting_days,
            multiplier,
        })
    }

    /// 하락률에 대한 투자 비율.
    pub fn investment_percent(&self, percent_drop: Percentage) -> Percentage {
        (percent_drop * Decimal::from(self.multiplier)).min(Decimal::ONE)
    }

    /// 하락률이 임계값 이상인지 확인합니다.
    pub fn is_triggered(&self, percent_drop: Percentage) -> bool {
        percent_drop >= self.threshold
    }
}

impl Default for DropRule {
    fn default() -> Self {
        Self {
            threshold: Decimal::new(35, 3),
            waiting_days: 3,
            multiplier: 9,
        }
    }
}

/// 투자 전략.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Strategy {
    /// 매월 적립금 전액 투자
    MonthlyInvest,
    /// 하락 시에만 투자
    MarketTiming(DropRule),
    /// 매월 일부 투자 + 하락 매수
    Hybrid {
        monthly_percent: Percentage,
        drop_rule: DropRule,
    },
}

impl Strategy {
    /// 검증된 하이브리드 전략을 생성합니다.
    pub fn hybrid(monthly_percent: Percentage, drop_rule: DropRule) -> SaverResult<Self> {
        let strategy = Strategy::Hybrid {
            monthly_percent,
            drop_rule,
        };
        strategy.validate()?;
        Ok(strategy)
    }

    /// 원시 파라미터에서 전략을 생성합니다.
    ///
    /// 모든 파라미터는 모드와 관계없이 검증됩니다.
    pub fn from_params(params: &StrategyParams) -> SaverResult<Self> {
        let kind: StrategyKind = params.mode.parse()?;

        if !params.perc_monthly_invest.is_unit_interval() {
            return Err(SaverError::InvalidParameter(format!(
                "perc_monthly_invest는 0과 1 사이여야 합니다: {}",
                params.perc_monthly_invest
            )));
        }
        let drop_rule = DropRule::new(
            params.perc_drop_threshold,
            params.waiting_days,
            params.drop_multiplier,
        )?;

        Ok(match kind {
            StrategyKind::MonthlyInvest => Strategy::MonthlyInvest,
            StrategyKind::MarketTiming => Strategy::MarketTiming(drop_rule),
            StrategyKind::Hybrid => Strategy::Hybrid {
                monthly_percent: params.perc_monthly_invest,
                drop_rule,
            },
        })
    }

    /// 같은 파라미터로 세 가지 전략을 모두 생성합니다.
    pub fn all_from_params(params: &StrategyParams) -> SaverResult<Vec<Self>> {
        StrategyKind::all()
            .iter()
            .map(|kind| Strategy::from_params(&params.clone().with_mode(kind.as_str())))
            .collect()
    }

    /// 직접 구성한 전략의 값을 검증합니다.
    pub fn validate(&self) -> SaverResult<()> {
        if let Strategy::Hybrid {
            monthly_percent, ..
        } = self
        {
            if !monthly_percent.is_unit_interval() {
                return Err(SaverError::InvalidParameter(format!(
                    "perc_monthly_invest는 0과 1 사이여야 합니다: {}",
                    monthly_percent
                )));
            }
        }
        if let Some(rule) = self.drop_rule() {
            if !rule.threshold.is_unit_interval() {
                return Err(SaverError::InvalidParameter(format!(
                    "perc_drop_threshold는 0과 1 사이여야 합니다: {}",
                    rule.threshold
                )));
            }
            if rule.waiting_days == 0 || rule.multiplier == 0 {
                return Err(SaverError::InvalidParameter(
                    "waiting_days와 drop_multiplier는 1 이상이어야 합니다".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::MonthlyInvest => StrategyKind::MonthlyInvest,
            Strategy::MarketTiming(_) => StrategyKind::MarketTiming,
            Strategy::Hybrid { .. } => StrategyKind::Hybrid,
        }
    }

    /// 매월 투자 비율 (monthly: 1, market timing: 0, hybrid: 설정값).
    pub fn monthly_percent(&self) -> Percentage {
        match self {
            Strategy::MonthlyInvest => Decimal::ONE,
            Strategy::MarketTiming(_) => Decimal::ZERO,
            Strategy::Hybrid {
                monthly_percent, ..
            } => *monthly_percent,
        }
    }

    /// 실제로 적용되는 하락 매수 규칙.
    ///
    /// 매월 투자 비율이 1이면 하락 매수에 쓸 현금이 남지 않으므로 None입니다.
    pub fn drop_rule(&self) -> Option<&DropRule> {
        match self {
            Strategy::MonthlyInvest => None,
            Strategy::MarketTiming(rule) => Some(rule),
            Strategy::Hybrid {
                monthly_percent,
                drop_rule,
            } => (*monthly_percent != Decimal::ONE).then_some(drop_rule),
        }
    }

    /// 보고서용 전략 이름.
    pub fn label(&self) -> &'static str {
        self.kind().as_str()
    }
}
