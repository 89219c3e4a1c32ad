//! Job endpoints: wire model, field validation and handlers.

pub mod handlers;
pub mod model;
pub mod validation;
