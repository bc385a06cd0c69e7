//! Sigma point generation and recombination for the augmented UKF.

pub use self::augmented::AugmentedSigmaPoints;
pub use self::weights::UTWeights;

mod augmented;


pub mod transform;
pub mod weights;

pub use transform::{unscented_transform, weighted_mean};
