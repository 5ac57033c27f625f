pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod flags;
pub mod output;
pub mod print;
pub mod sdk;
pub mod services;
