pub mod activation;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod train;

// Convenience re-exports
pub use activation::Activation;
pub use error::{Error, Result};
pub use layers::Layer;
pub use loss::MseLoss;
pub use math::Matrix;
pub use network::Network;
pub use train::{Dataset, Trainer};
