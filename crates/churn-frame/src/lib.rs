pub mod error;
pub mod frame;
pub mod tag;

pub use error::FrameError;
pub use frame::Frame;
pub use tag::RowTag;
