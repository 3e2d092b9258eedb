mod document;
mod duration;
mod item;
mod notification;
mod request;
mod request_query;
mod request_status;
mod role;
mod target;

pub use document::*;
pub use duration::*;
pub use item::*;
pub use notification::*;
pub use request::*;
pub use request_query::*;
pub use request_status::*;
pub use role::*;
pub use target::*;
