//! Run-event observer adapters.

mod jsonl;

pub use jsonl::JsonlRunObserver;
