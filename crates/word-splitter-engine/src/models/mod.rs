pub mod chapter;
pub mod document;
pub mod heading;

pub use chapter::Chapter;
pub use document::{BodyElement, ElementOrder, Paragraph, Run};
pub use heading::Heading;
