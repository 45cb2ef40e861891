mod risk;
mod submission;

pub use risk::*;
pub use submission::*;
