//! Plain data types shared by the simulator core and its front ends.

pub mod classification;
pub mod environment;
pub mod event;
pub mod file_formats;
pub mod profile;
pub mod scenario;
