// Core modules implementing the record codec, file scanning, queries, and error modeling.
pub mod error;
pub mod index;
pub mod query;
pub mod reader;
pub mod record;
