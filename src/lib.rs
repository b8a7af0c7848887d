pub mod binding;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod route_dump;
pub mod routing;
pub mod scene;

pub use binding::{bind_linear_element, unbind_linear_element};
#[cfg(feature = "cli")]
pub use cli::run;
pub use document::Document;
pub use error::DocumentError;
pub use routing::{ElbowRoute, RouteOptions, mutate_elbow_arrow, route_elbow_arrow};
pub use scene::{BindingEnd, ElbowArrow, Scene, SceneSnapshot, Shape, ShapeId};
