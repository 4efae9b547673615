pub mod assets;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod web;
