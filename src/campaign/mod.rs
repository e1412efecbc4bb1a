//! Island campaign: sectors, travel and the squad that crosses them

pub mod island;

pub use island::Island;
