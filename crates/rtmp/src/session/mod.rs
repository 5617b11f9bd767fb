mod define;
mod errors;
mod server_session;

pub use define::Role;
pub use errors::SessionError;
pub use server_session::{RecordingsDir, Session};
