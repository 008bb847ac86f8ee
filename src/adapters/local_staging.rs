use crate::domain::ports::Staging;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Filesystem staging area for acquired snapshots.
#[derive(Debug, Clone)]
pub struct LocalStaging {
    base_path: String,
}

impl LocalStaging {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Staging for LocalStaging {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}
