pub mod epoch_stats;
pub mod loop_fn;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::EpochStats;
pub use loop_fn::{fit, FitReport};
pub use train_config::{FitConfig, INIT_LR};
pub use trainer::{error_rate, train_epoch};
