pub mod book;
pub mod chapter;
pub mod paragraph;

pub use book::Book;
pub use chapter::{AlignmentState, Chapter};
pub use paragraph::{Paragraph, SubjectRef};
