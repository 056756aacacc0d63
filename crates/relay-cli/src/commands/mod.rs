pub mod assess;
pub mod config;
pub mod dispatch;
pub mod replay;
pub mod shared;
pub mod thoughts;
