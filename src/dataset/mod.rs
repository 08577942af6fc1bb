pub mod cleaning;
pub mod frame;
pub mod loader;

pub use frame::{Column, DataFrame, FeatureMatrix, FrameError, TimeColumn};
pub use loader::{read_csv, write_csv};
