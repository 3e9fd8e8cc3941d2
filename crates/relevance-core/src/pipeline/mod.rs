//! Comment scoring pipeline.
//!
//! - **attachments**: find image and link URLs in a comment body
//! - **processor**: embed, caption, extract, compare and combine

pub mod attachments;
pub mod processor;

pub use attachments::Attachments;
pub use processor::RelevancePipeline;
