pub mod actions;
pub mod env;
pub mod export;
pub mod inputs;
pub mod integrity;
pub mod metadata;
pub mod options;
pub mod platform;
pub mod provision;
pub mod redact;
pub mod runner;
pub mod toolchain;

pub use actions::ActionsRuntime;
pub use env::ExecutionEnv;
pub use export::{ArtifactExporter, ArtifactStore, DirectoryArtifactStore, ExportOutcome};
pub use inputs::{ActionInputs, Auth, InputError};
pub use metadata::{MetadataClient, MetadataError, VersionMetadata};
pub use options::{assemble, Assembly, AssemblyContext, AssemblyError, Diagnostic, Subcommand};
pub use platform::{Platform, PlatformError};
pub use provision::{BinaryProvisioner, InstalledBinary, ProvisionError, SetupSpec};
