//! Regression machinery: named designs, OLS, Newey-West inference.

pub mod design;
pub mod hac;
pub mod model;
pub mod ols;

pub use design::{Design, DesignBuilder};
pub use hac::{bartlett_weight, newey_west_cov};
pub use model::{fit_hac, FittedRegression, WaldTest};
