//! Skirmish - turn-based squad combat on generated island sectors

pub mod battle;
pub mod campaign;
pub mod core;
