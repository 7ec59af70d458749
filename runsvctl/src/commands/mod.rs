pub mod control;
pub mod id;
pub mod install;
pub mod logs;
pub mod packages;
pub mod uninstall;
pub mod view;
