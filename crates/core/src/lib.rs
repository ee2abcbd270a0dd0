// Core types shared by the merge engine and the I/O layer

pub mod batch;
pub mod record;
pub mod row;

pub use batch::BatchId;
pub use row::Row;
