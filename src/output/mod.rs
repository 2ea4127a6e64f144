//! Guide output: XMLTV rendering and the gzip artifact

pub mod artifact;
pub mod xmltv;

pub use artifact::{write_artifact, WrittenArtifact};
pub use xmltv::{escape_xml, XmltvGenerator};
