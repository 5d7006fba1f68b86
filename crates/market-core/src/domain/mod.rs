//! 도메인 모델.

pub mod candle;
pub mod series;

pub use candle::{Candle, DailyExtreme, ExtremeCandle, ExtremeKind};
pub use series::{CandleTable, SeriesKey};
