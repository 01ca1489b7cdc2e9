//! Tool domain: definitions offered to models, calls they request, and
//! the results fed back into the conversation.

pub mod entities;
pub mod value_objects;
