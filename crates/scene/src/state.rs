use crate::collection::{Collection, CollectionKind};
use crate::config::{
    DECORATION_COLOR, DECORATION_COUNT, FONT_PATH, ROTATION_STEP, SHAPE_COLOR, TEXTURE_PATH,
};
use crate::object::{Material, VisualObject};
use crate::populate;
use glam::Vec3;
use showcase_assets::{AssetLoader, AssetRequest, Font, TextureHandle};
use showcase_common::{Color, ObjectId};
use showcase_geometry::{Geometry, GeometryDescriptor, GeometryError};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
}

/// Scene lights. Matcap shading ignores them; the untextured fallback uses them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.5,
            },
            point: PointLight {
                color: Color::WHITE,
                intensity: 0.5,
                position: Vec3::new(2.0, 3.0, 4.0),
            },
        }
    }
}

/// All mutable scene state: the three collections, the lights and the assets
/// they depend on. Owned by the control thread; the panel and the render loop
/// borrow it.
pub struct SceneState {
    pub shapes: Collection,
    pub decorations: Collection,
    pub labels: Collection,
    pub lighting: Lighting,
    loader: AssetLoader,
    matcap: TextureHandle,
    font: Option<AssetRequest<Font>>,
    ticks: u64,
}

impl SceneState {
    /// Start loading the fixed assets and populate everything that does not
    /// wait on the font.
    ///
    /// The font is requested first so the synchronous texture load joins its
    /// batch; the observer sees one start and one complete for both.
    pub fn load(mut loader: AssetLoader) -> Self {
        let font = loader.load_font(FONT_PATH);
        let matcap = loader.load_texture(TEXTURE_PATH);
        Self::with_assets(loader, matcap, font)
    }

    pub fn with_assets(loader: AssetLoader, matcap: TextureHandle, font: AssetRequest<Font>) -> Self {
        let mut scene = Self {
            shapes: Collection::new(CollectionKind::Shapes),
            decorations: Collection::new(CollectionKind::Decorations),
            labels: Collection::new(CollectionKind::Labels),
            lighting: Lighting::default(),
            loader,
            matcap,
            font: Some(font),
            ticks: 0,
        };
        scene.populate_shapes();
        scene.populate_decorations(&mut rand::thread_rng());
        scene.poll_assets();
        scene
    }

    fn populate_shapes(&mut self) {
        let catalog = populate::shape_catalog();
        let count = catalog.len();
        for (i, descriptor) in catalog.into_iter().enumerate() {
            let kind = descriptor.kind();
            if let Err(e) =
                self.add_visual_object(descriptor, populate::row_position(i, count), SHAPE_COLOR)
            {
                tracing::warn!("skipping {kind} shape: {e}");
            }
        }
        tracing::info!("populated {} shapes", self.shapes.len());
    }

    fn populate_decorations(&mut self, rng: &mut impl rand::Rng) {
        let geometry = match Geometry::build(populate::decoration_geometry()) {
            Ok(g) => Arc::new(g),
            Err(e) => {
                tracing::warn!("no decorations: {e}");
                return;
            }
        };
        for object in
            populate::decorations(geometry, &self.matcap, DECORATION_COLOR, DECORATION_COUNT, rng)
        {
            self.decorations.push(object);
        }
        tracing::info!("populated {} decorations", self.decorations.len());
    }

    /// Build a shape and append it to the Shapes collection.
    pub fn add_visual_object(
        &mut self,
        descriptor: GeometryDescriptor,
        position: Vec3,
        color: Color,
    ) -> Result<ObjectId, GeometryError> {
        let geometry = Geometry::build(descriptor)?;
        let name = geometry.descriptor.kind().to_string();
        let object = VisualObject::new(
            name,
            Arc::new(geometry),
            Some(Material::matcap(self.matcap.clone(), color)),
        )
        .at(position);
        Ok(self.shapes.push(object))
    }

    /// Deliver finished asset loads. Builds the labels the first time the font
    /// resolves; returns whether it did so on this call.
    pub fn poll_assets(&mut self) -> bool {
        self.loader.poll();
        let Some(request) = &mut self.font else {
            return false;
        };
        let Some(result) = request.take_resolved() else {
            return false;
        };
        self.font = None;
        match result {
            Ok(font) => {
                for label in populate::labels(&font, &self.matcap) {
                    self.labels.push(label);
                }
                tracing::info!("populated {} labels", self.labels.len());
                true
            }
            Err(e) => {
                tracing::warn!("labels unavailable: {e}");
                false
            }
        }
    }

    /// One tick of scene animation: asset delivery, the automatic rotation of
    /// shapes and decorations, then running spins.
    pub fn update(&mut self, dt: f32) {
        self.poll_assets();
        self.shapes.rotate_all(ROTATION_STEP);
        self.decorations.rotate_all(ROTATION_STEP);
        for kind in CollectionKind::ALL {
            self.collection_mut(kind).advance_spins(dt);
        }
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn matcap(&self) -> &TextureHandle {
        &self.matcap
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    /// Whether the font is still outstanding.
    pub fn font_pending(&self) -> bool {
        self.font.as_ref().is_some_and(|r| r.state().is_pending())
    }

    pub fn collection(&self, kind: CollectionKind) -> &Collection {
        match kind {
            CollectionKind::Shapes => &self.shapes,
            CollectionKind::Decorations => &self.decorations,
            CollectionKind::Labels => &self.labels,
        }
    }

    pub fn collection_mut(&mut self, kind: CollectionKind) -> &mut Collection {
        match kind {
            CollectionKind::Shapes => &mut self.shapes,
            CollectionKind::Decorations => &mut self.decorations,
            CollectionKind::Labels => &mut self.labels,
        }
    }

    /// Every object in collection order: shapes, decorations, labels.
    pub fn objects(&self) -> impl Iterator<Item = &VisualObject> {
        self.shapes
            .iter()
            .chain(self.decorations.iter())
            .chain(self.labels.iter())
    }

    pub fn object_count(&self) -> usize {
        self.shapes.len() + self.decorations.len() + self.labels.len()
    }

    /// Global wireframe override across all three collections.
    pub fn set_wireframe_all(&mut self, wireframe: bool) {
        for kind in CollectionKind::ALL {
            self.collection_mut(kind).set_wireframe(wireframe);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LABEL_SPACING, LABEL_TEXTS};
    use showcase_assets::AssetError;
    use showcase_common::Axis;
    use std::f32::consts::TAU;

    const BLOCK_FONT: &str = r#"{
        "resolution": 1000,
        "boundingBox": { "yMin": -200, "yMax": 800 },
        "glyphs": { "?": { "ha": 600, "o": "m 0 0 l 500 0 l 500 700 l 0 700 z" } }
    }"#;

    fn scene_with(font: AssetRequest<Font>) -> SceneState {
        SceneState::with_assets(AssetLoader::default(), TextureHandle::failed("matcap.png"), font)
    }

    fn font_scene() -> SceneState {
        let font = Arc::new(Font::parse(BLOCK_FONT).unwrap());
        scene_with(AssetRequest::resolved("font.json", font))
    }

    #[test]
    fn populated_sizes() {
        let scene = scene_with(AssetRequest::pending("font.json"));
        assert_eq!(scene.shapes.len(), 15);
        assert_eq!(scene.decorations.len(), DECORATION_COUNT);
        assert_eq!(scene.labels.len(), 0);
        assert_eq!(scene.object_count(), 115);
    }

    #[test]
    fn decorations_are_in_range() {
        let scene = scene_with(AssetRequest::pending("font.json"));
        for o in &scene.decorations {
            let s = o.transform.scale;
            assert!((0.2..=0.7).contains(&s.x) && s.x == s.y && s.y == s.z);
            assert!(o.transform.position.abs().max_element() <= 10.0);
        }
    }

    #[test]
    fn unresolved_font_never_produces_labels() {
        let mut scene = scene_with(AssetRequest::pending("font.json"));
        for _ in 0..1000 {
            scene.update(1.0 / 60.0);
        }
        assert!(scene.labels.is_empty());
        assert!(scene.font_pending());
        assert_eq!(scene.objects().count(), 115);
    }

    #[test]
    fn failed_font_leaves_labels_empty() {
        let mut scene = scene_with(AssetRequest::failed("font.json", AssetError::MissingGlyphs));
        scene.update(0.016);
        assert!(scene.labels.is_empty());
        assert!(!scene.font_pending());
        assert_eq!(scene.shapes.len(), 15);
    }

    #[test]
    fn resolved_font_builds_labels_once() {
        let mut scene = font_scene();
        assert_eq!(scene.labels.len(), LABEL_TEXTS.len());
        assert!(!scene.poll_assets());
        scene.update(0.016);
        assert_eq!(scene.labels.len(), LABEL_TEXTS.len());
    }

    #[test]
    fn labels_are_stacked_and_centered() {
        let scene = font_scene();
        let ys: Vec<f32> = scene.labels.iter().map(|o| o.transform.position.y).collect();
        for w in ys.windows(2) {
            assert!((w[0] - w[1] - LABEL_SPACING).abs() < 1e-6);
        }
        for label in &scene.labels {
            let center = label.geometry.mesh.bounding_box().unwrap().center();
            assert!(center.length() < 1e-4);
        }
    }

    #[test]
    fn update_auto_rotates_shapes_and_decorations_only() {
        let mut scene = font_scene();
        let before: Vec<Vec3> = scene.objects().map(|o| o.transform.rotation).collect();
        scene.update(0.016);
        scene.update(0.016);
        let after: Vec<Vec3> = scene.objects().map(|o| o.transform.rotation).collect();
        let animated = scene.shapes.len() + scene.decorations.len();
        for (i, (b, a)) in before.iter().zip(&after).enumerate() {
            if i < animated {
                assert!((a.x - b.x - 2.0 * ROTATION_STEP).abs() < 1e-5);
                assert!((a.y - b.y - 2.0 * ROTATION_STEP).abs() < 1e-5);
            } else {
                assert_eq!(a, b);
            }
        }
        assert_eq!(scene.ticks(), 2);
    }

    #[test]
    fn label_spins_are_additive() {
        let mut scene = font_scene();
        let before: Vec<f32> = scene.labels.iter().map(|o| o.transform.rotation.y).collect();
        for _ in 0..3 {
            scene.labels.spin_all(1.0);
            scene.update(0.1);
        }
        for _ in 0..60 {
            scene.update(0.05);
        }
        for (o, b) in scene.labels.iter().zip(before) {
            assert!((o.transform.rotation.y - b - 3.0 * TAU).abs() < 1e-3);
        }
    }

    #[test]
    fn wireframe_override_reaches_every_collection() {
        let mut scene = font_scene();
        let g = scene.labels.iter().next().unwrap().geometry.clone();
        scene.labels.push(VisualObject::new("bare", g, None));
        scene.set_wireframe_all(true);
        for o in scene.objects() {
            if let Some(m) = &o.material {
                assert!(m.wireframe);
            }
        }
        scene.set_wireframe_all(false);
        assert!(scene.objects().filter_map(|o| o.material.as_ref()).all(|m| !m.wireframe));
    }

    #[test]
    fn slider_axis_overwrites_collection() {
        let mut scene = scene_with(AssetRequest::pending("font.json"));
        scene.collection_mut(CollectionKind::Decorations).set_axis(Axis::Z, 2.5);
        assert!(scene.decorations.iter().all(|o| o.transform.position.z == 2.5));
        assert!(scene.shapes.iter().any(|o| o.transform.position.z == 0.0));
    }

    #[test]
    fn add_visual_object_appends_to_shapes() {
        let mut scene = scene_with(AssetRequest::pending("font.json"));
        let id = scene
            .add_visual_object(
                GeometryDescriptor::Box { width: 1.0, height: 1.0, depth: 1.0 },
                Vec3::new(0.0, 4.0, 0.0),
                Color::rgb(0.0, 1.0, 0.0),
            )
            .unwrap();
        assert_eq!(scene.shapes.len(), 16);
        let o = scene.shapes.get(id).unwrap();
        assert_eq!(o.transform.position.y, 4.0);
        assert!(!o.material.as_ref().unwrap().matcap.is_ready());
    }

    #[derive(Clone, Default)]
    struct Recorder(std::rc::Rc<std::cell::RefCell<Vec<String>>>);

    impl showcase_assets::LoadObserver for Recorder {
        fn on_start(&mut self, _url: &str, loaded: usize, total: usize) {
            self.0.borrow_mut().push(format!("start {loaded}/{total}"));
        }
        fn on_progress(&mut self, _url: &str, loaded: usize, total: usize) {
            self.0.borrow_mut().push(format!("progress {loaded}/{total}"));
        }
        fn on_complete(&mut self) {
            self.0.borrow_mut().push("complete".into());
        }
        fn on_error(&mut self, _url: &str, _error: &AssetError) {
            self.0.borrow_mut().push("error".into());
        }
    }

    #[test]
    fn startup_assets_share_one_batch() {
        let recorder = Recorder::default();
        let events = recorder.0.clone();
        let mut scene = SceneState::load(AssetLoader::new(Box::new(recorder)));
        for _ in 0..500 {
            if !scene.font_pending() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
            scene.poll_assets();
        }
        assert!(!scene.font_pending());

        let events = events.borrow();
        assert_eq!(events.first().map(String::as_str), Some("start 0/1"));
        assert_eq!(events.iter().filter(|e| e.starts_with("start")).count(), 1);
        assert_eq!(events.iter().filter(|e| *e == "complete").count(), 1);
        assert_eq!(
            &events[events.len() - 2..],
            &["progress 2/2".to_string(), "complete".to_string()]
        );
    }
}
