pub mod app;
pub mod auth;
pub mod bmi;
pub mod chatbot;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod profiles;
pub mod state;
