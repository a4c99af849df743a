//! Zeppelin core: job status model and snapshot extraction, free of IO.
mod envelope;
mod note;
mod paragraph;
mod segment;
mod status;

pub use envelope::{Envelope, EnvelopeError};
pub use note::NoteResult;
pub use paragraph::ParagraphResult;
pub use segment::ResultSegment;
pub use status::Status;
