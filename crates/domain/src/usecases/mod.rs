//! Application use cases / business logic

pub mod compose;
pub mod illustrate;
pub mod post_once;

pub use compose::{ComposeConfig, Composer};
pub use illustrate::{IllustrateConfig, Illustrator};
pub use post_once::{AgentError, PostAgent, PostAgentConfig};
