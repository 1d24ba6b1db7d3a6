pub mod app;
pub mod components;
pub mod config;
pub mod dashboard;
pub mod events;
pub mod feed;
pub mod format;
pub mod mock;
pub mod polyline;
pub mod state;
pub mod view;
