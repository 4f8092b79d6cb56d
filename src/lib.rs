pub mod book_index;
pub mod config;
pub mod error;
pub mod lookup;
pub mod order;
pub mod order_book;
pub mod price_level;
pub mod shell;
pub mod ticks;
pub mod trade;

// Re-export main types for easier use
pub use book_index::{BookIndex, LevelInfo, Locator};
pub use config::BookConfig;
pub use error::{OrderBookError, OrderBookResult};
pub use order::{Order, OrderId, OrderModify, OrderType, Price, Quantity, Side};
pub use order_book::OrderBook;
pub use ticks::Tick;
pub use trade::{Trade, TradeInfo, Trades};
