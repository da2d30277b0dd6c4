pub mod chat;
pub mod credentials;
pub mod error;
pub mod events;
pub mod navigation;
pub mod prompts;
pub mod providers;
pub mod requests;
pub mod screens;
pub mod session;
