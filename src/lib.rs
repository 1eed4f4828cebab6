pub mod api_routes;
pub mod chat_history;
pub mod config;
pub mod image_diffusion;
pub mod image_prompt;
pub mod input_process;
pub mod interactive_mode;
pub mod logging_setup;
pub mod openai_chat;
pub mod session_manager;
pub mod ui_page;
