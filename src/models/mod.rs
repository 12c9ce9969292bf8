pub mod admin_code;
pub mod caller;
pub mod event;

pub use admin_code::AdminCode;
pub use caller::Caller;
pub use event::{Event, NewEvent};
