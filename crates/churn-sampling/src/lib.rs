pub mod combine;
pub mod enn;
pub mod error;
mod knn;
pub mod smote;

pub use combine::SmoteEnn;
pub use enn::EditedNearestNeighbours;
pub use error::SamplingError;
pub use smote::Smote;
