pub mod config;
pub mod driver;
pub mod kernel;
pub mod outputs;
pub mod services;

// Re-export specific items for convenient access
pub use config::WidgetConfig;
pub use driver::WidgetDriver;
pub use kernel::controller::ConversationController;
