//! Core library for idchat: configuration, logging, the identity session and
//! the chat relay. Nothing in here touches the terminal.

pub mod chat;
pub mod config;
pub mod identity;
pub mod logging;
