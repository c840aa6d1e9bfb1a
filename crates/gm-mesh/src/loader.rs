use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use gm_core::mesh::Mesh;

use crate::error::MeshError;
use crate::{glb, obj};

/// Recognised mesh formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshFormat {
    /// Wavefront OBJ (text).
    Obj,
    /// Binary glTF.
    Glb,
}

impl MeshFormat {
    /// Classify a path by extension.
    ///
    /// # Errors
    /// [`MeshError::UnsupportedFormat`] for anything other than `.obj`/`.glb`.
    ///
    /// # Example
    /// ```
    /// use gm_mesh::MeshFormat;
    /// use std::path::Path;
    /// assert_eq!(MeshFormat::from_path(Path::new("a/b.GLB")).unwrap(), MeshFormat::Glb);
    /// assert!(MeshFormat::from_path(Path::new("model.stl")).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self, MeshError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("obj") => Ok(Self::Obj),
            Some("glb") => Ok(Self::Glb),
            _ => Err(MeshError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Content sniffing: glTF magic → GLB, otherwise OBJ.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Self {
        match bytes.get(..4) {
            Some(magic) if magic == glb::GLB_MAGIC.to_le_bytes() => Self::Glb,
            _ => Self::Obj,
        }
    }

    /// Format of a file from its extension and its first bytes.
    ///
    /// The glTF magic always wins, so a GLB saved as `.obj` (or without
    /// extension) still decodes. A file without extension and without the
    /// magic is read as OBJ text.
    ///
    /// # Errors
    /// [`MeshError::UnsupportedFormat`] for an unknown extension without the glTF magic.
    ///
    /// # Example
    /// ```
    /// use gm_mesh::MeshFormat;
    /// use std::path::Path;
    /// let glb = b"glTF\x02\x00\x00\x00";
    /// assert_eq!(MeshFormat::detect(Path::new("mislabelled.obj"), glb).unwrap(), MeshFormat::Glb);
    /// assert_eq!(MeshFormat::detect(Path::new("noext"), b"v 0 0 0").unwrap(), MeshFormat::Obj);
    /// assert!(MeshFormat::detect(Path::new("scan.stl"), b"solid").is_err());
    /// ```
    pub fn detect(path: &Path, bytes: &[u8]) -> Result<Self, MeshError> {
        let sniffed = Self::sniff(bytes);
        if path.extension().is_none() {
            return Ok(sniffed);
        }
        match (Self::from_path(path), sniffed) {
            (Ok(Self::Obj) | Err(_), Self::Glb) => {
                log::debug!("{} : magic glTF, décodé en GLB", path.display());
                Ok(Self::Glb)
            }
            (by_extension, _) => by_extension,
        }
    }
}

/// Decodes a buffer in the given format.
///
/// `name_hint` replaces the default name of OBJ files without `o`/`g`.
///
/// # Errors
/// Propagates the decoder's [`MeshError`].
pub fn decode(bytes: &[u8], format: MeshFormat, name_hint: &str) -> Result<Mesh, MeshError> {
    match format {
        MeshFormat::Glb => glb::decode_glb(bytes),
        MeshFormat::Obj => {
            let text = String::from_utf8_lossy(bytes);
            let mut mesh = obj::decode_obj(&text)?;
            if mesh.name == obj::DEFAULT_OBJ_NAME && !name_hint.is_empty() {
                mesh.name = name_hint.to_string();
            }
            Ok(mesh)
        }
    }
}

/// Reads and decodes an `.obj` / `.glb` file (blocking).
///
/// The format comes from [`MeshFormat::detect`].
///
/// # Errors
/// [`MeshError::Io`] if the file cannot be read, [`MeshError::UnsupportedFormat`]
/// for an unrecognised file, otherwise the decoder error.
pub fn load_mesh(path: &Path) -> Result<Mesh, MeshError> {
    let bytes = std::fs::read(path).map_err(|source| MeshError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let format = MeshFormat::detect(path, &bytes)?;
    let hint = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    decode(&bytes, format, hint)
}

/// Background decode that can be cancelled.
///
/// The result arrives on a one-shot channel. Cancelling (or dropping) the
/// job guarantees its result is never observed.
///
/// # Example
/// ```
/// use gm_mesh::loader::{DecodeJob, MeshSlot, SlotEvent};
/// use gm_mesh::procedural::cube;
/// let mut slot = MeshSlot::new(cube());
/// slot.request(DecodeJob::spawn_path("missing/model.obj".into()));
/// let event = loop {
///     if let Some(event) = slot.poll() {
///         break event;
///     }
///     std::thread::yield_now();
/// };
/// assert!(matches!(event, SlotEvent::Failed(_)));
/// assert_eq!(slot.current().name, "cube");
/// ```
pub struct DecodeJob {
    label: String,
    cancel: Arc<AtomicBool>,
    rx: flume::Receiver<Result<Mesh, MeshError>>,
}

impl DecodeJob {
    /// Reads and decodes `path` on a dedicated thread.
    #[must_use]
    pub fn spawn_path(path: PathBuf) -> Self {
        let label = path.display().to_string();
        Self::spawn(label, move || load_mesh(&path))
    }

    fn spawn<F>(label: String, work: F) -> Self
    where
        F: FnOnce() -> Result<Mesh, MeshError> + Send + 'static,
    {
        let (tx, rx) = flume::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let thread_label = label.clone();

        let spawned = std::thread::Builder::new()
            .name("mesh-decode".into())
            .spawn(move || {
                if flag.load(Ordering::Acquire) {
                    return;
                }
                let result = work();
                if flag.load(Ordering::Acquire) {
                    log::debug!("Décodage de {thread_label} annulé, résultat jeté");
                    return;
                }
                let _ = tx.send(result);
            });

        let rx = match spawned {
            Ok(_) => rx,
            Err(source) => {
                log::error!("Impossible de lancer le thread de décodage : {source}");
                let (tx, rx) = flume::bounded(1);
                let _ = tx.send(Err(MeshError::Io {
                    path: label.clone(),
                    source,
                }));
                rx
            }
        };
        Self { label, cancel, rx }
    }

    /// What is being decoded (path or name).
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Requests cancellation. Any result is discarded.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Non-blocking. `None` while the decode is running.
    pub fn poll(&self) -> Option<Result<Mesh, MeshError>> {
        if self.is_cancelled() {
            return Some(Err(MeshError::Cancelled));
        }
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(flume::TryRecvError::Empty) => None,
            Err(flume::TryRecvError::Disconnected) => Some(Err(MeshError::format(
                "thread de décodage interrompu sans résultat",
            ))),
        }
    }
}

impl Drop for DecodeJob {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// The active mesh and the decode that may replace it.
///
/// The slot is the only owner of the displayed mesh: renderers take
/// [`current`](Self::current) and re-sync when the pointer changes. A
/// successful decode swaps the `Arc` in one assignment; a failure leaves
/// the previous mesh in place.
///
/// # Example
/// ```
/// use gm_mesh::loader::MeshSlot;
/// use gm_mesh::procedural::cube;
/// let slot = MeshSlot::new(cube());
/// assert_eq!(slot.current().name, "cube");
/// ```
pub struct MeshSlot {
    current: Arc<Mesh>,
    pending: Option<DecodeJob>,
    fit_extent: Option<f32>,
}

/// Outcome of a decode, observed by [`MeshSlot::poll`].
#[derive(Debug)]
pub enum SlotEvent {
    /// New active mesh (same `Arc` as [`MeshSlot::current`]).
    Replaced(Arc<Mesh>),
    /// Failure: the previous mesh stays active.
    Failed(MeshError),
}

impl MeshSlot {
    #[must_use]
    pub fn new(mesh: Mesh) -> Self {
        Self {
            current: Arc::new(mesh),
            pending: None,
            fit_extent: None,
        }
    }

    /// Decoded meshes are centred and scaled to `extent` before they become active.
    #[must_use]
    pub fn fit_loaded(mut self, extent: f32) -> Self {
        self.fit_extent = Some(extent);
        self
    }

    /// The active mesh.
    #[must_use]
    pub fn current(&self) -> &Arc<Mesh> {
        &self.current
    }

    /// Starts a decode; a job already running is cancelled.
    pub fn request(&mut self, job: DecodeJob) {
        if let Some(old) = self.pending.replace(job) {
            log::debug!("Décodage de {} remplacé", old.label());
            old.cancel();
        }
    }

    /// Call once per tick: applies the decode result when it is ready.
    pub fn poll(&mut self) -> Option<SlotEvent> {
        let result = self.pending.as_ref()?.poll()?;
        let job = self.pending.take()?;
        match result {
            Ok(mut mesh) if mesh.is_renderable() => {
                log::info!(
                    "Maillage '{}' chargé depuis {} ({} sommets, {} faces)",
                    mesh.name,
                    job.label(),
                    mesh.vertices.len(),
                    mesh.faces.len()
                );
                if let Some(extent) = self.fit_extent {
                    mesh.center_and_fit(extent);
                }
                self.current = Arc::new(mesh);
                Some(SlotEvent::Replaced(Arc::clone(&self.current)))
            }
            Ok(_) => {
                log::warn!("{} : maillage sans face, ignoré", job.label());
                Some(SlotEvent::Failed(MeshError::Empty))
            }
            Err(e) => {
                log::warn!("Échec du chargement de {} : {e}", job.label());
                Some(SlotEvent::Failed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procedural;
    use std::time::{Duration, Instant};

    fn spawn_bytes(bytes: Vec<u8>, format: MeshFormat, name: &str) -> DecodeJob {
        let hint = name.to_string();
        DecodeJob::spawn(name.to_string(), move || decode(&bytes, format, &hint))
    }

    fn wait_job(job: &DecodeJob) -> Result<Mesh, MeshError> {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(result) = job.poll() {
                return result;
            }
            assert!(Instant::now() < deadline, "décodage trop long");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn poll_until(slot: &mut MeshSlot) -> SlotEvent {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(ev) = slot.poll() {
                return ev;
            }
            assert!(Instant::now() < deadline, "décodage trop long");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn sniff_detects_glb_magic() {
        let glb = glb::tests::indexed_quad(5123);
        assert_eq!(MeshFormat::sniff(&glb), MeshFormat::Glb);
        assert_eq!(MeshFormat::sniff(b"v 0 0 0"), MeshFormat::Obj);
        assert_eq!(MeshFormat::sniff(b""), MeshFormat::Obj);
    }

    #[test]
    fn obj_name_hint_only_replaces_default() {
        let mesh = decode(b"v 0 0 0", MeshFormat::Obj, "hint").unwrap();
        assert_eq!(mesh.name, "hint");
        let mesh = decode(b"o real\nv 0 0 0", MeshFormat::Obj, "hint").unwrap();
        assert_eq!(mesh.name, "real");
    }

    #[test]
    fn successful_decode_replaces_mesh() {
        let mut slot = MeshSlot::new(procedural::cube());
        slot.request(spawn_bytes(
            glb::tests::indexed_quad(5125),
            MeshFormat::Glb,
            "quad.glb",
        ));
        assert!(slot.pending.is_some());
        assert!(matches!(poll_until(&mut slot), SlotEvent::Replaced(_)));
        assert_eq!(slot.current().name, "quad");
        assert!(slot.pending.is_none());
    }

    #[test]
    fn failed_decode_keeps_previous_mesh() {
        let mut slot = MeshSlot::new(procedural::cube());
        slot.request(spawn_bytes(
            b"glTF garbage".to_vec(),
            MeshFormat::Glb,
            "bad.glb",
        ));
        assert!(matches!(
            poll_until(&mut slot),
            SlotEvent::Failed(MeshError::Format(_))
        ));
        assert_eq!(slot.current().name, "cube");
    }

    #[test]
    fn vertices_without_faces_keep_previous_mesh() {
        let mut slot = MeshSlot::new(procedural::cube());
        slot.request(spawn_bytes(b"v 1 2 3".to_vec(), MeshFormat::Obj, "pt"));
        assert!(matches!(
            poll_until(&mut slot),
            SlotEvent::Failed(MeshError::Empty)
        ));
        assert_eq!(slot.current().name, "cube");
    }

    #[test]
    fn cancelled_job_never_delivers() {
        let job = spawn_bytes(b"v 0 0 0".to_vec(), MeshFormat::Obj, "x");
        job.cancel();
        assert!(matches!(job.poll(), Some(Err(MeshError::Cancelled))));
    }

    #[test]
    fn new_request_supersedes_pending() {
        let mut slot = MeshSlot::new(procedural::cube());
        slot.request(spawn_bytes(
            crate::obj::to_obj(&procedural::pyramid()).into_bytes(),
            MeshFormat::Obj,
            "first",
        ));
        slot.request(spawn_bytes(
            glb::tests::indexed_quad(5121),
            MeshFormat::Glb,
            "second",
        ));
        assert!(matches!(poll_until(&mut slot), SlotEvent::Replaced(_)));
        assert_eq!(slot.current().name, "quad");
    }

    #[test]
    fn missing_file_is_io_error() {
        let job = DecodeJob::spawn_path(PathBuf::from("/nonexistent/model.obj"));
        assert!(matches!(wait_job(&job), Err(MeshError::Io { .. })));
    }

    #[test]
    fn loaded_mesh_is_fitted_and_shared() {
        let mut slot = MeshSlot::new(procedural::cube()).fit_loaded(0.5);
        let big = "o big\nv 100 0 0\nv 140 0 0\nv 100 40 0\nf 1 2 3\n";
        slot.request(spawn_bytes(big.as_bytes().to_vec(), MeshFormat::Obj, "big"));
        let SlotEvent::Replaced(mesh) = poll_until(&mut slot) else {
            panic!("décodage attendu");
        };
        assert!(Arc::ptr_eq(&mesh, slot.current()));
        let (min, max) = slot.current().bounds().unwrap();
        assert!((max.x - 0.5).abs() < 1e-5 && (min.x + 0.5).abs() < 1e-5);
    }

    #[test]
    fn detect_prefers_magic_over_extension() {
        let glb = glb::tests::indexed_quad(5123);
        let at = |p: &str, bytes: &[u8]| MeshFormat::detect(Path::new(p), bytes);
        assert_eq!(at("mislabelled.obj", &glb).unwrap(), MeshFormat::Glb);
        assert_eq!(at("noext", &glb).unwrap(), MeshFormat::Glb);
        assert_eq!(at("model.bin", &glb).unwrap(), MeshFormat::Glb);
        assert_eq!(at("noext", b"v 0 0 0").unwrap(), MeshFormat::Obj);
        assert_eq!(at("broken.glb", b"v 0 0 0").unwrap(), MeshFormat::Glb);
        assert!(matches!(
            at("scan.stl", b"solid x"),
            Err(MeshError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn load_mesh_reads_mislabelled_files() {
        let dir = tempfile::tempdir().unwrap();
        let glb_as_obj = dir.path().join("quad.obj");
        std::fs::write(&glb_as_obj, glb::tests::indexed_quad(5125)).unwrap();
        assert_eq!(load_mesh(&glb_as_obj).unwrap().faces.len(), 2);

        let bare = dir.path().join("tri");
        std::fs::write(&bare, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        assert_eq!(load_mesh(&bare).unwrap().faces.len(), 1);
    }
}
