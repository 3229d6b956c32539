//! Request and response payloads of the three engine APIs.

pub mod cromwell;
pub mod tes;
pub mod wes;
