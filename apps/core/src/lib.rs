pub mod catalog;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod hotkey;
pub mod index_store;
pub mod logging;
pub mod model;
pub mod navigation;
pub mod preferences;
pub mod presentation;
pub mod runtime;
pub mod search;
pub mod search_session;
pub mod shortcut;
pub mod transport;
