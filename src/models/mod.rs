pub mod insight;
pub mod intraday;
pub mod stock;

pub use insight::*;
pub use intraday::*;
pub use stock::*;
