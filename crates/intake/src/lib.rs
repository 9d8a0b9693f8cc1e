pub mod http;
pub mod notify;
pub mod server;
pub mod submit;

pub use submit::{Intake, SubmitOutcome};
