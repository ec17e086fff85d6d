pub mod arbiter;
pub mod collide;
pub mod features;

pub use arbiter::{Arbiter, Contact, MAX_CONTACTS, PairKey};
pub use collide::collide;
pub use features::{Edge, FeaturePair};
