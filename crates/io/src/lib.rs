// File I/O: the batch archive, table encoding, reference stops, output

pub mod archive;
pub mod encoding;
pub mod error;
pub mod reference;
pub mod writer;

pub use archive::ZipArchiveSource;
pub use error::ArchiveError;
pub use reference::read_reference_stops;
pub use writer::write_tables;
