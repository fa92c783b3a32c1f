//! The binary codec: decode and encode for both pointer-width dialects.
pub mod decode;
pub mod encode;
mod layout;

pub use decode::decode;
pub use encode::encode;
