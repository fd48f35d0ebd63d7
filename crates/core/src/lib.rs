pub mod approval;
pub mod chapters;
pub mod error;
pub mod lives;
pub mod pagination;
pub mod practice;
pub mod progress;
pub mod roles;
pub mod store;
pub mod types;
pub mod usecases;
pub mod users;
pub mod validation;
