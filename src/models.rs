pub mod filter;
pub mod project;
pub mod tag;
pub mod task;
pub mod ui;

pub use filter::{FilterState, FilterUpdate, PriorityFilter, StatusFilter};
pub use project::{Project, ProjectWithStats};
pub use tag::{Tag, TagWithStats};
pub use task::{Priority, Task, TaskStats, TasksByPriority};
pub use ui::{Theme, UiState, View};
