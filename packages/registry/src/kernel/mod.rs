// Infrastructure: dependency container, service traits, test mocks

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{RegistryDeps, TracingNotifier};
pub use test_dependencies::{test_deps, MockNotifier};
pub use traits::BaseNotifier;
