//! Online question answering
//!
//! [`QueryPipeline`] holds the loaded knowledge base and service clients;
//! [`QuerySession`] runs the interactive loop over it.

pub mod input;
pub mod pipeline;
pub mod session;
pub mod state;

pub use input::{is_quit, InputHandler, LineReader, UserInput};
pub use pipeline::{Answer, QueryPipeline, RetrievedContext, DEFAULT_TOP_K};
pub use session::{QuerySession, SessionStats};
pub use state::{QueryEvent, QueryState};
