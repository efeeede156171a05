pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod thread;

// Re-export main types for convenience
pub use client::{Backend, BackendClient, Timeouts};
pub use config::Config;
pub use error::{BackendError, OrEmpty};
pub use session::{InFlightSend, Notice, PendingSend, SendOutcome, SessionState, SessionStore};
pub use state::{Message, Role};
pub use thread::ThreadId;
