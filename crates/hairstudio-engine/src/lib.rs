pub mod config;
pub mod dryrun;
pub mod gateway;
pub mod gemini;
mod http;
pub mod orchestrator;
pub mod replicate;

pub use config::{GatewayConfig, ReplicateVerification};
pub use gateway::{ProviderAdapter, ProviderGateway, ProviderOutput};
pub use orchestrator::SessionOrchestrator;
