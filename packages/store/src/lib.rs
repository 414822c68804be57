pub mod models;
pub mod outcome;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use models::{Item, ItemId, ListId, TodoList, User, UserId};
pub use outcome::{Created, Mutation};
pub use repo::{TaskStore, Tasks, UserStore};
