//! Ownership of the byte buffers backing uploaded models.
//!
//! Every upload is registered once and gets a [`SourceHandle`]. The manager
//! is the only place a handle can be released, and releasing twice is a no-op
//! so cleanup racing with a rapid model swap can't fault.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

/// A file handed over by the acquisition surface (dialog, drag and drop, CLI).
#[derive(Clone, Debug)]
pub struct IncomingFile {
    /// Filename hint, if the source provided one
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    pub fn new(name: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk, keeping its filename as the format hint
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }
}

/// Lifetime token of a registered byte source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SourceHandle(Uuid);

impl std::fmt::Display for SourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Read-many view of an uploaded file's bytes
#[derive(Clone, Debug)]
pub struct ByteSource {
    handle: SourceHandle,
    name: Option<String>,
    bytes: Arc<[u8]>,
}

impl ByteSource {
    pub fn handle(&self) -> SourceHandle {
        self.handle
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Registry of live byte sources
#[derive(Default)]
pub struct ResourceManager {
    live: HashMap<SourceHandle, ByteSource>,
    released: u64,
}

impl ResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an uploaded file. The returned source carries its handle.
    pub fn acquire(&mut self, file: IncomingFile) -> ByteSource {
        let handle = SourceHandle(Uuid::new_v4());
        let source = ByteSource {
            handle,
            name: file.name,
            bytes: Arc::from(file.bytes.into_boxed_slice()),
        };
        tracing::debug!(
            "Acquired source {handle} ({} bytes, {:?})",
            source.len(),
            source.name()
        );
        self.live.insert(handle, source.clone());
        source
    }

    /// Release a handle. Returns false when it was already released.
    pub fn release(&mut self, handle: SourceHandle) -> bool {
        match self.live.remove(&handle) {
            Some(_) => {
                self.released += 1;
                tracing::debug!("Released source {handle}");
                true
            }
            None => false,
        }
    }

    pub fn is_live(&self, handle: SourceHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn get(&self, handle: SourceHandle) -> Option<&ByteSource> {
        self.live.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of successful releases so far
    pub fn released_count(&self) -> u64 {
        self.released
    }

    pub fn release_all(&mut self) {
        let handles: Vec<SourceHandle> = self.live.keys().copied().collect();
        for handle in handles {
            self.release(handle);
        }
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.release_all();
    }
}
