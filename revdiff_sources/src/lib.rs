mod command;
mod memory;

pub use command::CommandFetcher;
pub use memory::MemorySource;
