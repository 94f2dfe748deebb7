pub mod api_client;
pub mod api_key;
pub mod config;
pub mod history;
pub mod logger;
pub mod tool_executor;
