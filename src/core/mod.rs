// Core modules: session lifecycle, result serialization, and error modeling.
pub mod downsample;
pub mod error;
pub mod numeric;
pub mod serialize;
pub mod session;
