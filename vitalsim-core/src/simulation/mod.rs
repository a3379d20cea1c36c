pub mod builder;
pub mod clock;
pub mod engine;
pub mod state;
