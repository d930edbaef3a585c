pub mod batches;
pub mod dataset;
pub mod split;
pub mod synthetic;

pub use batches::{Batch, MiniBatchIterator, BATCH_SIZE, row_batches};
pub use dataset::Dataset;
pub use split::{oversample_class, shuffle, train_test_split};
pub use synthetic::gaussian_blobs;
