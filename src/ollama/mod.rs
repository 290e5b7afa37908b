pub mod inference_interface;
pub mod ollama_client;

pub use inference_interface::*;
pub use ollama_client::*;
