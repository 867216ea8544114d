use std::{fs::File, ops::Deref, path::Path};

use anyhow::{bail, Context};
use memmap2::Mmap;

/// Read-only mapping of a kernel image file.
pub struct KernelImage {
    map: Mmap,
}

impl KernelImage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
        let len = file
            .metadata()
            .with_context(|| format!("failed to stat {}", path.display()))?
            .len();
        if len == 0 {
            bail!("{} is empty", path.display());
        }

        let map = unsafe { Mmap::map(&file) }
            .with_context(|| format!("failed to map {}", path.display()))?;
        Ok(Self { map })
    }

    pub fn as_slice(&self) -> &[u8] {
        self.map.as_ref()
    }
}

impl Deref for KernelImage {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}
