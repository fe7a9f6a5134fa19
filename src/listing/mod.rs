// Directory listing core: path resolution, reading, ordering, formatting

mod error;
mod format;
mod lister;
mod order;
mod path;
mod sorter;

pub use error::ListingError;
pub use format::{format_size, format_timestamp, human_readable_size};
pub use lister::{DirectoryEntry, ListingOptions, read_entries};
pub use order::{OrderPolicy, OrderState, SortKey};
pub use path::PathState;
pub use sorter::sort_entries;
