// src/models.rs

pub mod account;
pub mod appointment;
pub mod auth;
pub mod dashboard;
pub mod hospital;
pub mod ticket;
