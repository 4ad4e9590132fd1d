mod classification;

pub use classification::{Classification, ClassificationSchema, ClassificationSource};
