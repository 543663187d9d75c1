pub mod home;
pub mod rest;
