pub mod admin;
pub mod auth;
pub mod contact;
pub mod dashboard;
pub mod gallery;
pub mod properties;
