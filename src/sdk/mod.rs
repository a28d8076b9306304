pub mod config;
pub mod points;
pub mod routing;
pub mod tour;
pub mod util;
