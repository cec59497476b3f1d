pub mod dynamic;
pub mod service;

pub use crate::domain::base::Base;
pub use crate::domain::ports::ServiceClient;
pub use crate::utils::error::Result;
