pub mod classifier;
pub mod connection_state;
pub mod engine;
pub mod offline_bank;
pub mod oracles;
pub mod prompt_builder;
pub mod response_parser;
pub mod stream_client;
pub mod validator;

pub use engine::Engine;
