//! Line-following control law.
//!
//! PD steering on the reflectance error, followed by a curvature-dependent
//! speed policy that turns the correction into wheel powers.

pub mod pd;
pub mod speed;
