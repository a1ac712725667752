//! Subscribers for risk updates

pub mod console;
pub mod telegram;

// Re-export for convenience
pub use console::ConsoleEventHandler;
pub use telegram::TelegramEventHandler;
