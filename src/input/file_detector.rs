//! Snapshot format detection

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotFormat {
    Json,
    Toml,
    Unknown,
}

impl SnapshotFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" => SnapshotFormat::Json,
            "toml" => SnapshotFormat::Toml,
            _ => SnapshotFormat::Unknown,
        }
    }
}
