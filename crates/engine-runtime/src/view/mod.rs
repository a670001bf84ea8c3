pub mod controller;
pub mod session;
pub mod status;

pub use controller::{Applied, LoadOutcome, LoadTicket, RemoteProgress, TableView};
pub use session::{Loader, TableSession};
pub use status::ViewStatus;
