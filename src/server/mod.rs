pub mod builder;
pub mod handler;
mod page;

pub use builder::{BoundServer, ServerBuilder};
pub use handler::RequestHandler;
pub use page::render_page;
