//! 공통 열거형 타입.

pub mod exchange;
pub mod granularity;
pub mod pair;

pub use exchange::Exchange;
pub use granularity::Granularity;
pub use pair::Pair;
