pub mod mat22;
pub mod utils;
pub mod vec2;

pub use mat22::Mat22;
pub use utils::sign;
pub use vec2::Vec2;
