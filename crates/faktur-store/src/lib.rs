mod file;
mod memory;

pub use file::{INVOICES_KEY, JsonFileStore, TEMPLATES_KEY};
pub use memory::InMemoryStore;
