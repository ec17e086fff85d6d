pub mod body;
pub mod joint;
pub mod world;

pub use body::Body;
pub use joint::Joint;
pub use world::{BodyId, JointId, SolverConfig, World};
