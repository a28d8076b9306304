pub mod local;
pub mod remote;
pub mod types;

pub use local::LocalOrsProvider;
pub use remote::RemoteOrsProvider;
