//! 캔들 간격 정의.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// 캔들 샘플링 간격.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// 1시간봉
    Hour,
    /// 1분봉
    Minute,
}

impl Granularity {
    /// 지원하는 모든 간격.
    pub const ALL: [Granularity; 2] = [Granularity::Hour, Granularity::Minute];

    /// 저장/표시용 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Minute => "minute",
        }
    }

    /// 캔들 하나의 기간을 반환합니다.
    pub fn duration(&self) -> Duration {
        match self {
            Granularity::Hour => Duration::from_secs(60 * 60),
            Granularity::Minute => Duration::from_secs(60),
        }
    }

    /// 초 단위 기간.
    pub fn as_secs(&self) -> u64 {
        self.duration().as_secs()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hour" | "1h" | "h1" => Ok(Granularity::Hour),
            "minute" | "1m" | "m1" => Ok(Granularity::Minute),
            _ => Err(format!("Invalid granularity: {}", s)),
        }
    }
}
