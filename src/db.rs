// src/db.rs

pub mod repository;
pub use repository::{AccountRepository, AppointmentRepository, HospitalRepository, TicketRepository};

pub mod hospital_repo;
pub use hospital_repo::PgHospitalRepository;
pub mod account_repo;
pub use account_repo::PgAccountRepository;
pub mod appointment_repo;
pub use appointment_repo::PgAppointmentRepository;
pub mod ticket_repo;
pub use ticket_repo::PgTicketRepository;

pub mod memory_repo;
pub use memory_repo::MemoryStore;
