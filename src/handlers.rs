// src/handlers.rs

pub mod admin;
pub mod appointments;
pub mod auth;
pub mod doctor;
pub mod hospitals;
pub mod nurse;
pub mod superadmin;
pub mod tickets;
