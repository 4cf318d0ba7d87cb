//! HTTP clients for the dashboard frontend: the login/signup forms and the
//! file-drop upload widget.

pub mod auth;
pub mod upload;

pub use auth::{AuthClient, AuthReply, ClientError};
pub use upload::{DataSummary, FileUpload, ProcessOutcome, SelectedFile, UploadError};
