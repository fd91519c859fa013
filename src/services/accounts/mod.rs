//! Accounts: registration, sessions and profiles
pub mod account_service;
pub mod profile_service;

pub use account_service::{AccountService, SignUpInput};
pub use profile_service::{ProfileService, ProfileView, UpdateProfileInput};
