pub mod config;
pub mod decoding;
pub mod errors;
pub mod extraction;
pub mod resumes;
pub mod routes;
pub mod state;
