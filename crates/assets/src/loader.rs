use crate::{AssetError, AssetRequest, AssetState, Font, Texture, TextureHandle, TextureId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Receives loader lifecycle notifications.
pub trait LoadObserver {
    /// First item of a batch started loading.
    fn on_start(&mut self, url: &str, loaded: usize, total: usize);
    /// An item finished, successfully or not.
    fn on_progress(&mut self, url: &str, loaded: usize, total: usize);
    /// Every started item has finished.
    fn on_complete(&mut self);
    fn on_error(&mut self, url: &str, error: &AssetError);
}

/// Observer that reports through `tracing`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LoadObserver for LogObserver {
    fn on_start(&mut self, url: &str, loaded: usize, total: usize) {
        tracing::info!("loading started: {url} ({loaded}/{total})");
    }

    fn on_progress(&mut self, url: &str, loaded: usize, total: usize) {
        tracing::info!("loading progress: {url} ({loaded}/{total})");
    }

    fn on_complete(&mut self) {
        tracing::info!("loading complete");
    }

    fn on_error(&mut self, url: &str, error: &AssetError) {
        tracing::error!("loading error: {url}: {error}");
    }
}

/// Item counters for the current loading batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingProgress {
    pub loaded: usize,
    pub total: usize,
    pub loading: bool,
}

struct PendingFont {
    url: String,
    path: PathBuf,
    receiver: Receiver<Result<Font, AssetError>>,
    state: Rc<RefCell<AssetState<Font>>>,
}

/// Loads textures synchronously and fonts on a background thread, caching
/// both for the lifetime of the loader.
pub struct AssetLoader {
    observer: Box<dyn LoadObserver>,
    progress: LoadingProgress,
    textures: HashMap<PathBuf, TextureHandle>,
    textures_by_content: HashMap<TextureId, Arc<Texture>>,
    fonts: HashMap<PathBuf, Arc<Font>>,
    pending_fonts: Vec<PendingFont>,
}

impl AssetLoader {
    pub fn new(observer: Box<dyn LoadObserver>) -> Self {
        Self {
            observer,
            progress: LoadingProgress::default(),
            textures: HashMap::new(),
            textures_by_content: HashMap::new(),
            fonts: HashMap::new(),
            pending_fonts: Vec::new(),
        }
    }

    pub fn progress(&self) -> LoadingProgress {
        self.progress
    }

    /// Number of font loads still in flight.
    pub fn pending_count(&self) -> usize {
        self.pending_fonts.len()
    }

    /// Number of distinct decoded textures held by the cache.
    pub fn texture_count(&self) -> usize {
        self.textures_by_content.len()
    }

    /// Load and decode a texture. The returned handle is never an error; a
    /// failed load yields a handle without a texture.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref();
        if let Some(handle) = self.textures.get(path) {
            return handle.clone();
        }

        let url = path.display().to_string();
        self.item_start(&url);
        let handle = match std::fs::read(path)
            .map_err(AssetError::from)
            .and_then(|bytes| self.decode_cached(&bytes))
        {
            Ok(texture) => {
                tracing::debug!(
                    "decoded texture {url}: {}x{}",
                    texture.width,
                    texture.height
                );
                TextureHandle::ready(&url, texture)
            }
            Err(e) => {
                self.observer.on_error(&url, &e);
                TextureHandle::failed(&url)
            }
        };
        self.item_end(&url);

        self.textures.insert(path.to_path_buf(), handle.clone());
        handle
    }

    /// Start loading a typeface font. The request resolves during a later
    /// [`poll`](Self::poll).
    pub fn load_font(&mut self, path: impl AsRef<Path>) -> AssetRequest<Font> {
        let path = path.as_ref().to_path_buf();
        let url = path.display().to_string();
        if let Some(font) = self.fonts.get(&path) {
            return AssetRequest::resolved(&url, font.clone());
        }

        self.item_start(&url);
        let state = Rc::new(RefCell::new(AssetState::Pending));
        let (sender, receiver) = mpsc::channel();
        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("font-loader".into())
            .spawn(move || {
                if sender.send(Font::load(&thread_path)).is_err() {
                    tracing::debug!(
                        "font {} finished after its loader was dropped",
                        thread_path.display()
                    );
                }
            });

        match spawned {
            Ok(_) => {
                self.pending_fonts.push(PendingFont {
                    url: url.clone(),
                    path,
                    receiver,
                    state: state.clone(),
                });
            }
            Err(e) => {
                let e = AssetError::from(e);
                self.observer.on_error(&url, &e);
                *state.borrow_mut() = AssetState::Failed(Arc::new(e));
                self.item_end(&url);
            }
        }
        AssetRequest::new(&url, state)
    }

    /// Deliver finished background loads. Returns how many resolved.
    pub fn poll(&mut self) -> usize {
        let mut resolved = 0;
        let mut still_pending = Vec::with_capacity(self.pending_fonts.len());

        for pending in std::mem::take(&mut self.pending_fonts) {
            let outcome = match pending.receiver.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => {
                    still_pending.push(pending);
                    continue;
                }
                Err(TryRecvError::Disconnected) => {
                    Err(AssetError::Disconnected(pending.url.clone()))
                }
            };

            let state = match outcome {
                Ok(font) => {
                    tracing::debug!(
                        "font {} ready: {} glyphs",
                        pending.url,
                        font.glyph_count()
                    );
                    let font = Arc::new(font);
                    self.fonts.insert(pending.path.clone(), font.clone());
                    AssetState::Ready(font)
                }
                Err(e) => {
                    self.observer.on_error(&pending.url, &e);
                    AssetState::Failed(Arc::new(e))
                }
            };
            *pending.state.borrow_mut() = state;
            self.item_end(&pending.url);
            resolved += 1;
        }

        self.pending_fonts = still_pending;
        resolved
    }

    fn decode_cached(&mut self, bytes: &[u8]) -> Result<Arc<Texture>, AssetError> {
        let id = TextureId::of_bytes(bytes);
        if let Some(texture) = self.textures_by_content.get(&id) {
            return Ok(texture.clone());
        }
        let texture = Arc::new(Texture::decode(bytes)?);
        self.textures_by_content.insert(id, texture.clone());
        Ok(texture)
    }

    fn item_start(&mut self, url: &str) {
        self.progress.total += 1;
        if !self.progress.loading {
            self.progress.loading = true;
            self.observer
                .on_start(url, self.progress.loaded, self.progress.total);
        }
    }

    fn item_end(&mut self, url: &str) {
        self.progress.loaded += 1;
        self.observer
            .on_progress(url, self.progress.loaded, self.progress.total);
        if self.progress.loaded == self.progress.total {
            self.progress.loading = false;
            self.observer.on_complete();
        }
    }
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new(Box::new(LogObserver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const FONT_JSON: &str = r#"{
        "resolution": 1000,
        "boundingBox": { "yMin": -200, "yMax": 800 },
        "glyphs": { "A": { "ha": 600, "o": "m 0 0 l 600 0 l 300 700 z" } }
    }"#;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Start(usize, usize),
        Progress(usize, usize),
        Complete,
        Error(String),
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Event>>>);

    impl LoadObserver for Recorder {
        fn on_start(&mut self, _url: &str, loaded: usize, total: usize) {
            self.0.borrow_mut().push(Event::Start(loaded, total));
        }
        fn on_progress(&mut self, _url: &str, loaded: usize, total: usize) {
            self.0.borrow_mut().push(Event::Progress(loaded, total));
        }
        fn on_complete(&mut self) {
            self.0.borrow_mut().push(Event::Complete);
        }
        fn on_error(&mut self, url: &str, _error: &AssetError) {
            self.0.borrow_mut().push(Event::Error(url.to_string()));
        }
    }

    fn recording_loader() -> (AssetLoader, Rc<RefCell<Vec<Event>>>) {
        let recorder = Recorder::default();
        let events = recorder.0.clone();
        (AssetLoader::new(Box::new(recorder)), events)
    }

    fn wait_for(loader: &mut AssetLoader) {
        for _ in 0..500 {
            if loader.poll() > 0 || loader.pending_count() == 0 {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("font load did not finish");
    }

    #[test]
    fn texture_load_success_reports_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matcap.png");
        image::RgbaImage::from_pixel(4, 2, image::Rgba([200, 100, 50, 255]))
            .save(&path)
            .unwrap();

        let (mut loader, events) = recording_loader();
        let handle = loader.load_texture(&path);
        let texture = handle.texture().unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.rgba.len(), 4 * 2 * 4);
        assert_eq!(
            *events.borrow(),
            vec![Event::Start(0, 1), Event::Progress(1, 1), Event::Complete]
        );
    }

    #[test]
    fn texture_load_is_cached_by_path_and_content() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        let img = image::RgbaImage::from_pixel(1, 1, image::Rgba([1, 2, 3, 255]));
        img.save(&a).unwrap();
        img.save(&b).unwrap();

        let mut loader = AssetLoader::default();
        let h1 = loader.load_texture(&a);
        let h2 = loader.load_texture(&a);
        let h3 = loader.load_texture(&b);
        assert!(Arc::ptr_eq(h1.texture().unwrap(), h2.texture().unwrap()));
        assert!(Arc::ptr_eq(h1.texture().unwrap(), h3.texture().unwrap()));
        assert_eq!(loader.texture_count(), 1);
    }

    #[test]
    fn missing_texture_reports_error_without_failing() {
        let (mut loader, events) = recording_loader();
        let handle = loader.load_texture("does/not/exist.png");
        assert!(!handle.is_ready());
        let events = events.borrow();
        assert!(events.contains(&Event::Error("does/not/exist.png".into())));
        assert_eq!(events.last(), Some(&Event::Complete));
    }

    #[test]
    fn font_resolves_on_poll() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.typeface.json");
        std::fs::write(&path, FONT_JSON).unwrap();

        let (mut loader, events) = recording_loader();
        let mut request = loader.load_font(&path);
        assert_eq!(events.borrow().as_slice(), &[Event::Start(0, 1)]);

        wait_for(&mut loader);
        let font = request.take_resolved().unwrap().unwrap();
        assert!(font.glyph('A').is_some());
        assert!(request.take_resolved().is_none());
        assert_eq!(events.borrow().last(), Some(&Event::Complete));

        // Cached: a second request is resolved immediately.
        let mut again = loader.load_font(&path);
        assert!(Arc::ptr_eq(&font, &again.take_resolved().unwrap().unwrap()));
    }

    #[test]
    fn missing_font_fails_request() {
        let (mut loader, events) = recording_loader();
        let mut request = loader.load_font("nowhere/font.json");
        wait_for(&mut loader);
        assert!(request.take_resolved().unwrap().is_err());
        assert!(
            events
                .borrow()
                .contains(&Event::Error("nowhere/font.json".into()))
        );
        assert_eq!(loader.progress().loaded, loader.progress().total);
    }

    #[test]
    fn batch_completes_after_last_item() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.json");
        std::fs::write(&path, FONT_JSON).unwrap();

        let (mut loader, events) = recording_loader();
        let _font = loader.load_font(&path);
        let _tex = loader.load_texture("missing.png");
        // Texture finished first; the batch still waits on the font.
        assert!(!events.borrow().contains(&Event::Complete));
        wait_for(&mut loader);
        assert_eq!(events.borrow().last(), Some(&Event::Complete));
        let completes = events.borrow().iter().filter(|e| **e == Event::Complete).count();
        assert_eq!(completes, 1);
        assert_eq!(
            loader.progress(),
            LoadingProgress {
                loaded: 2,
                total: 2,
                loading: false
            }
        );
    }

    #[test]
    fn dropped_loader_does_not_strand_the_font_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.json");
        std::fs::write(&path, FONT_JSON).unwrap();

        let (mut loader, events) = recording_loader();
        let request = loader.load_font(&path);
        drop(loader);
        // The loader thread finds the receiver gone and logs instead of sending.
        std::thread::sleep(Duration::from_millis(100));
        assert!(request.state().is_pending());
        assert_eq!(events.borrow().as_slice(), &[Event::Start(0, 1)]);
    }
}
