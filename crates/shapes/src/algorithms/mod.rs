pub mod grayscale;
pub mod preprocessing;
pub mod threshold;
pub mod extraction;
pub mod boundary;
pub mod simplification;
pub mod classification;

pub use grayscale::*;
pub use preprocessing::*;
pub use threshold::*;
pub use extraction::*;
pub use boundary::*;
pub use simplification::*;
pub use classification::*;
