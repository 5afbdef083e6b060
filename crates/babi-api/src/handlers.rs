//! Request handlers.

pub mod account;
pub mod catalog;
pub mod generate;
pub mod health;
pub mod profile;
pub mod session;
pub mod subscription;

pub use account::*;
pub use catalog::*;
pub use generate::*;
pub use health::*;
pub use profile::*;
pub use session::*;
pub use subscription::*;
