pub extern crate euclid;
pub extern crate serde;
pub extern crate serde_json;

mod identity_registry;
mod message;
mod session_state;
mod types;

pub use identity_registry::*;
pub use message::*;
pub use session_state::*;
pub use types::*;
