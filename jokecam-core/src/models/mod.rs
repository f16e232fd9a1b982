// jokecam-core/src/models/mod.rs
pub mod chat;
