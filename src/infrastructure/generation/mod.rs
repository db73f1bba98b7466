//! Generation infrastructure - forwarding admitted requests to the model server

mod model_server;

pub use model_server::ModelServerClient;
