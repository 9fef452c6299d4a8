//! Real-time nowcasting correction: train/eval split, per-horizon
//! correction models, and expanding-window forecast combination.

pub mod combination;
pub mod correction;
pub mod split;

pub use combination::{combine, CombinedNowcast};
pub use correction::{CorrectedSeries, CorrectionFit, CorrectionModel, HorizonData};
pub use split::{guard_strictly_prior, TrainEvalSplit};
