// src/common.rs

pub mod error;
pub mod password;
pub mod tokens;
