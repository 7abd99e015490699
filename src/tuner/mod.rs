pub mod best;
pub mod optimizer;
pub mod params;
pub mod perturbation;
pub mod schedule;
pub mod session;
pub mod step;

pub use best::*;
pub use optimizer::*;
pub use params::*;
pub use perturbation::*;
pub use schedule::*;
pub use session::*;
pub use step::*;
