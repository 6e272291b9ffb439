// Domain models

mod container;
mod host;
mod settings;
mod snapshot;

pub use container::{Container, ContainerAction, ContainerStats};
pub use host::HostStats;
pub use settings::{AppSettings, ContainerSettings, ContainerSettingsUpdate};
pub use snapshot::{HostSample, Snapshot};
