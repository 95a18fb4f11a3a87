pub mod app;
pub mod audio;
pub mod canvas;
pub mod color;
pub mod config;
pub mod device;
pub mod director;
pub mod error;
pub mod explosion;
pub mod particle;
pub mod rocket;
pub mod schedule;
pub mod sim;
pub mod surface;
pub mod trail;
