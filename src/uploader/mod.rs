pub mod bimsync_client;
pub mod pipeline;
pub mod token;

pub use bimsync_client::{BimsyncParams, RevisionAck, UploadClient};
pub use pipeline::UploadOrchestrator;
pub use token::{Credential, TokenRefresher};
