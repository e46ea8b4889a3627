mod auth_service;
mod cache_service;
mod email_service;
mod institution_service;
mod notification_service;
mod recipient_service;

pub use auth_service::*;
pub use cache_service::*;
pub use email_service::*;
pub use institution_service::*;
pub use notification_service::*;
pub use recipient_service::*;
