pub mod cyclical;
pub mod error;
pub mod normality;
pub mod quantile;
pub mod scaler;
pub mod split;

pub use cyclical::{encode_hour, encode_month};
pub use error::PreprocessError;
pub use normality::{route_columns, shapiro_wilk, ColumnRouting, ShapiroTest};
pub use quantile::QuantileTransformer;
pub use scaler::StandardScaler;
pub use split::{split_by_tag, train_test_split, TagSplit};
