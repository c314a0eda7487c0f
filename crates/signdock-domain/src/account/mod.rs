mod aggregate;
mod repository;
mod value_objects;

pub use aggregate::{Account, AccountPatch, AccountProfile};
pub use repository::AccountRepository;
pub use value_objects::{HttpMethod, RequestBodyTemplate, SuccessKeywords};
