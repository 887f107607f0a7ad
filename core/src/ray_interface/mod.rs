pub mod fields;
pub mod output;
pub mod props;

pub use fields::{MomentFields, RayInput};
pub use output::RlanOutput;
pub use props::RayProps;
