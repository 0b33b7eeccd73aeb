pub mod task_registry;

pub use task_registry::{RegistryCounts, TaskRegistry};
