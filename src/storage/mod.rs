pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;
pub use traits::SessionStore;
