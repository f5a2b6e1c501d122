//! Agents built on the chat nodes.

pub mod chat;
