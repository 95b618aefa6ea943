pub mod candles;
pub mod export;
