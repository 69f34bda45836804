pub mod media;
pub mod request;

pub use media::{AuthParams, ClientAuthResponse, Transformation, UploadRequest, UploadResult};
pub use request::ApiResponse;
