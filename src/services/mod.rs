//! External service integrations and the pattern pipeline

pub mod arr;
pub mod autobrr;
pub mod http;
pub mod lists;
pub mod logging;
pub mod processor;
pub mod tags;
pub mod title;

pub use arr::ArrClient;
pub use autobrr::{AutobrrClient, AutobrrError, Filter, FilterUpdater, UpdateFilter};
pub use lists::ListClient;
pub use logging::{LogFormat, init_logging};
pub use processor::{ProcessKind, ProcessorService};
pub use title::process_title;
