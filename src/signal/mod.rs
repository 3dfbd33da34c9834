// Parsing of the structured verdict returned by the summarisation layer
pub mod trade_result;

pub use trade_result::{
    PositionPermission, PositionSide, TradeResult, UnparseableResult, parse_trade_result,
};
