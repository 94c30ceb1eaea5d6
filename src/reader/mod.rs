mod artifact_reader;

pub use artifact_reader::{ArrayInfo, ArtifactReader};
