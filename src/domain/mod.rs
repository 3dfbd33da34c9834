// Domain types and value objects
pub mod candle;
pub mod timeframe;

// Re-export commonly used types
pub use candle::Candle;
pub use timeframe::Timeframe;
