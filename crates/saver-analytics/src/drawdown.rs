//! 이동 최고가 대비 하락률 계산.
//!
//! 각 거래일에 대해 후행 `window_size` 거래일(당일 포함) 고가의 최댓값과,
//! 그 값 대비 수정 종가의 하락률을 계산합니다.
//!
//! # 윈도우 채움 이전 구간
//!
//! 처음 `window_size - 1`개 레코드는 완전한 윈도우가 없습니다. 이 구간의 값은
//! [`WarmupPolicy`]로 결정합니다:
//!
//! - [`WarmupPolicy::SharedPrefixMax`] (기본값): 구간 전체 고가의 최댓값 하나를
//!   모든 레코드에 동일하게 부여합니다. 기존 계산 결과와 호환되는 방식입니다.
//! - [`WarmupPolicy::ExpandingMax`]: 각 레코드에 시작일부터 당일까지의 최댓값을
//!   부여합니다.

use std::collections::VecDeque;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use saver_core::{AnnotatedRecord, DailyRecord, Price, SaverError, SaverResult};

/// 기본 이동 최고가 윈도우 (약 6개월).
pub const DEFAULT_WINDOW_SIZE: usize = 125;

/// 윈도우가 채워지기 전 구간의 이동 최고가 결정 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// 구간 전체의 최댓값 하나를 공유
    #[default]
    SharedPrefixMax,
    /// 시작일부터 당일까지의 누적 최댓값
    ExpandingMax,
}

impl WarmupPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarmupPolicy::SharedPrefixMax => "shared_prefix_max",
            WarmupPolicy::ExpandingMax => "expanding_max",
        }
    }

    /// 채움 이전 구간의 고가로부터 이동 최고가를 계산합니다.
    fn fill(&self, highs: &[Price]) -> Vec<Price> {
        match self {
            WarmupPolicy::SharedPrefixMax => {
                let shared = highs.iter().copied().max().unwrap_or(Decimal::ZERO);
                vec![shared; highs.len()]
            }
            WarmupPolicy::ExpandingMax => highs
                .iter()
                .scan(None::<Price>, |running, &high| {
                    let next = running.map_or(high, |m: Price| m.max(high));
                    *running = Some(next);
                    Some(next)
                })
                .collect(),
        }
    }
}

impl FromStr for WarmupPolicy {
    type Err = SaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "shared_prefix_max" | "shared" => Ok(Self::SharedPrefixMax),
            "expanding_max" | "expanding" => Ok(Self::ExpandingMax),
            _ => Err(SaverError::InvalidParameter(format!(
                "warmup은 shared_prefix_max 또는 expanding_max여야 합니다: {}",
                s
            ))),
        }
    }
}

/// 하락률 주석기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawdownAnnotator {
    window_size: usize,
    warmup: WarmupPolicy,
}

impl Default for DrawdownAnnotator {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            warmup: WarmupPolicy::default(),
        }
    }
}

impl DrawdownAnnotator {
    /// 새 주석기를 생성합니다. `window_size`는 1 이상이어야 합니다.
    pub fn new(window_size: usize) -> SaverResult<Self> {
        if window_size == 0 {
            return Err(SaverError::InvalidParameter(
                "window_size는 1 이상이어야 합니다: 0".to_string(),
            ));
        }
        Ok(Self {
            window_size,
            ..Default::default()
        })
    }

    /// 채움 이전 구간 처리 방식을 설정합니다.
    pub fn with_warmup(mut self, warmup: WarmupPolicy) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn warmup(&self) -> WarmupPolicy {
        self.warmup
    }

    /// 이동 최고가 시계열을 계산합니다.
    pub fn moving_max(&self, records: &[DailyRecord]) -> Vec<Price> {
        let highs: Vec<Price> = records.iter().map(|r| r.high).collect();
        let prefix_len = (self.window_size - 1).min(highs.len());

        let mut result = self.warmup.fill(&highs[..prefix_len]);
        result.reserve(highs.len() - prefix_len);

        // 단조 감소 덱: 앞쪽이 현재 윈도우의 최댓값 인덱스
        let mut window: VecDeque<usize> = VecDeque::with_capacity(self.window_size);
        for (i, &high) in highs.iter().enumerate() {
            while window.back().map_or(false, |&j| highs[j] <= high) {
                window.pop_back();
            }
            window.push_back(i);
            while window.front().map_or(false, |&j| j + self.window_size <= i) {
                window.pop_front();
            }

            if i >= prefix_len {
                result.push(highs[window[0]]);
            }
        }

        result
    }

    /// 레코드에 이동 최고가와 하락률을 추가합니다.
    pub fn annotate(&self, records: &[DailyRecord]) -> Vec<AnnotatedRecord> {
        let moving_max = self.moving_max(records);

        debug!(
            records = records.len(),
            window = self.window_size,
            warmup = self.warmup.as_str(),
            "drawdown annotated"
        );

        records
            .iter()
            .zip(moving_max)
            .map(|(daily, moving_max)| AnnotatedRecord {
                percent_drop: percent_drop(daily.adjusted_close, moving_max),
                daily: daily.clone(),
                moving_max,
            })
            .collect()
    }
}

/// 이동 최고가 대비 하락률 (1 - 가격 / 최고가). 최고가가 0이면 None.
pub fn percent_drop(price: Price, moving_max: Price) -> Option<Decimal> {
    if moving_max.is_zero() {
        None
    } else {
        Some(Decimal::ONE - price / moving_max)
    }
}

/// 기본 채움 방식으로 레코드에 하락률을 추가합니다.
pub fn annotate(records: &[DailyRecord], window_size: usize) -> SaverResult<Vec<AnnotatedRecord>> {
    Ok(DrawdownAnnotator::new(window_size)?.annotate(records))
}
