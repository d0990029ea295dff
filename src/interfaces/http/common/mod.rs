pub mod api_response;
pub mod error;
pub mod validated_json;

pub use api_response::{ApiResponse, EmptyData};
pub use error::{error_response, status_for, ApiError};
pub use validated_json::ValidatedJson;
