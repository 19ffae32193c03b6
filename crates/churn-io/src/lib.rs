pub mod csv_io;
pub mod error;
pub mod export;
pub mod snapshot;

pub use csv_io::{read_dataset, Dataset};
pub use error::DataError;
pub use export::{write_predictions, PredictionRow};
pub use snapshot::{read_snapshot, write_snapshot, Snapshot};
