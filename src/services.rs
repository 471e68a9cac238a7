// src/services.rs

pub mod access;
pub mod appointment_service;
pub mod approval_service;
pub mod auth;
pub mod dashboard_service;
pub mod hospital_service;
pub mod mailer;
pub mod ticket_service;

#[cfg(test)]
pub mod testing;
#[cfg(test)]
mod tests;
