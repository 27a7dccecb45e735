pub mod dispatch;
pub mod views;
