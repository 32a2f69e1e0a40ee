pub mod activities;
pub mod admin;
pub mod login;
pub mod profile;
