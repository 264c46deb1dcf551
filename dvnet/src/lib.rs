pub mod concepts;
pub mod feedback;
pub mod framework;
pub mod host;
pub mod link;
pub mod network;
pub mod router;
pub mod util;
