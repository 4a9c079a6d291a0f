//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, EventSink)
//! but are themselves concrete structs, not traits.

mod index;
mod loader;

pub use index::{IndexService, RefreshTicket};
pub use loader::{LoadedUrls, SourceFormat, UrlListLoader};
