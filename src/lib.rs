// src/lib.rs

pub mod layout;
pub mod process;
