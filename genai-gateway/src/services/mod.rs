pub mod completion;
pub mod metrics;
pub mod providers;

pub use completion::CompletionService;
