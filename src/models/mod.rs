//! Domain models exchanged with the backend.

pub mod activity;
pub mod amount;
pub mod donation;
pub mod id;
pub mod user;

pub use activity::*;
pub use amount::*;
pub use donation::*;
pub use id::*;
pub use user::*;
