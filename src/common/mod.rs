pub mod clock;
pub mod response;

pub use clock::{Clock, SystemClock};
pub use response::ErrorMessage;
