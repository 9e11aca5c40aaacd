use showcase_common::{Axis, Color};
use showcase_scene::config::SPIN_DURATION;
use showcase_scene::{CollectionKind, SceneState};

/// A scene mutation requested by a panel widget.
///
/// Widgets never touch the scene directly; they emit actions and the caller
/// applies them once drawing is done.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelAction {
    /// Overwrite one position axis across a whole collection.
    SetAxis {
        collection: CollectionKind,
        axis: Axis,
        value: f32,
    },
    /// Set the material color of a whole collection.
    SetColor {
        collection: CollectionKind,
        color: Color,
    },
    /// Start one full turn on every member of a collection.
    Spin(CollectionKind),
    /// Global wireframe override for all collections.
    SetWireframe(bool),
}

impl PanelAction {
    pub fn apply(&self, scene: &mut SceneState) {
        tracing::debug!("panel action: {self:?}");
        match *self {
            PanelAction::SetAxis {
                collection,
                axis,
                value,
            } => scene.collection_mut(collection).set_axis(axis, value),
            PanelAction::SetColor { collection, color } => {
                scene.collection_mut(collection).set_color(color)
            }
            PanelAction::Spin(collection) => {
                scene.collection_mut(collection).spin_all(SPIN_DURATION)
            }
            PanelAction::SetWireframe(on) => scene.set_wireframe_all(on),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_assets::{AssetLoader, AssetRequest, TextureHandle};

    fn scene() -> SceneState {
        SceneState::with_assets(
            AssetLoader::default(),
            TextureHandle::failed("matcap.png"),
            AssetRequest::pending("font.json"),
        )
    }

    #[test]
    fn set_axis_applies_to_named_collection() {
        let mut scene = scene();
        PanelAction::SetAxis {
            collection: CollectionKind::Shapes,
            axis: Axis::X,
            value: 3.5,
        }
        .apply(&mut scene);
        assert!(scene.shapes.iter().all(|o| o.transform.position.x == 3.5));
        assert!(scene.decorations.iter().any(|o| o.transform.position.x != 3.5));
    }

    #[test]
    fn set_color_applies_to_named_collection() {
        let mut scene = scene();
        let teal = Color::from_hex(0x008080);
        PanelAction::SetColor {
            collection: CollectionKind::Decorations,
            color: teal,
        }
        .apply(&mut scene);
        for o in &scene.decorations {
            assert_eq!(o.material.as_ref().unwrap().color, teal);
        }
        assert_ne!(scene.shapes.iter().next().unwrap().material.as_ref().unwrap().color, teal);
    }

    #[test]
    fn spin_queues_on_every_member() {
        let mut scene = scene();
        PanelAction::Spin(CollectionKind::Shapes).apply(&mut scene);
        PanelAction::Spin(CollectionKind::Shapes).apply(&mut scene);
        assert!(scene.shapes.iter().all(|o| o.active_spins() == 2));
        assert!(scene.decorations.iter().all(|o| o.active_spins() == 0));
    }

    #[test]
    fn wireframe_is_global() {
        let mut scene = scene();
        PanelAction::SetWireframe(true).apply(&mut scene);
        assert!(scene.objects().all(|o| o.material.as_ref().unwrap().wireframe));
    }
}
