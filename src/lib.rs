pub mod application;
pub mod commands;
pub mod package;
pub mod package_manager;
pub mod plugins;
pub mod runtime;
pub mod ui;
