pub mod check;
pub mod commands;
pub mod config;
pub mod perms;
pub mod report;
pub mod roster;
pub mod settings;
pub mod toolchain;
pub mod utils;
pub mod wildcard;
