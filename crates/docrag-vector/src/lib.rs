pub mod collection;
pub mod schema;
pub mod search;
pub mod table;
pub mod writer;

pub use collection::LanceCollection;
