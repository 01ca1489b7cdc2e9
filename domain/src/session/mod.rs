//! Conversation types exchanged with a model gateway: the messages of a
//! request and the structured response of one round.

pub mod message;
pub mod request;
pub mod response;
