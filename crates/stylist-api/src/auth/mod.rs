pub mod middleware;
pub mod session;

pub use middleware::{session_guard, AuthState};
pub use session::{FirebaseSessionVerifier, Session, SessionVerifier};
