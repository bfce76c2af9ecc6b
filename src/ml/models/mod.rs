pub mod classifier;

pub use classifier::{check_training_pair, Classifier};
