mod connection;
mod epoll_wrapper;
mod router;
pub mod server;

pub use connection::{ClientConnection, ConnState, ConnectionError};
pub use epoll_wrapper::{Epoll, Interest, SocketEvent};
pub use router::{error_response, find_route, route_request};
pub use server::{Server, create_listener};
