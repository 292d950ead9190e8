// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod google;
pub mod sse;

#[cfg(test)]
pub(crate) mod testing;

pub use provider::*;
