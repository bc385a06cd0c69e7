//! Small numeric helpers shared by the models and the engine.

pub mod angle;

pub use angle::normalize_angle;
