mod admin;
mod institution;
mod mentor;
mod notification;
mod user;

pub use admin::*;
pub use institution::*;
pub use mentor::*;
pub use notification::*;
pub use user::*;
