// Device dashboards - Live and cached dashboards pushed by connected devices
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
