mod memory;

pub use memory::InMemoryNewsRepository;
