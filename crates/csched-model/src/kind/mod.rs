mod strategy;
pub use strategy::Strategy;

mod command;
pub use command::split_command;
