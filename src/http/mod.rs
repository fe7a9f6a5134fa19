mod request;
mod response;

pub use request::{HttpRequest, ParseError};
pub use response::HttpResponse;
