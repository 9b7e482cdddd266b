//! CLI command implementations.

pub mod build;
pub mod init;
pub mod list;
pub mod search;
pub mod serve;
pub mod show;
pub mod site;
pub mod verify;

pub use build::build_site;
pub use init::init_project;
pub use list::{list_posts, list_tags};
pub use search::search_site;
pub use serve::serve;
pub use show::show_document;
pub use verify::verify_site;
