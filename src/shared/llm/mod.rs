mod parser;
mod response;

pub use parser::parse_json;
pub use response::response_schema;
