pub mod jsonl;

pub use jsonl::JsonlConverter;
