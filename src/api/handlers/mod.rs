// src/api/handlers/mod.rs
mod health;
mod scripts;
mod sessions;

pub use health::health_check;
pub use scripts::{edit, finalize, generate, save_manual, upload_script};
pub use sessions::{evaluate_session, get_history};
