//! Remote generation API collaborator.

mod backend;
mod types;
mod veo;

pub use backend::VideoBackend;
pub use types::{GenerationOptions, GenerationPayload, OperationSnapshot};
pub use veo::{VeoClient, VeoClientBuilder, VeoModel};
