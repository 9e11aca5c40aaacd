use crate::object::VisualObject;
use showcase_common::{Axis, Color, ObjectId};

/// The three named groups of objects; each shares one set of panel controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKind {
    Shapes,
    Decorations,
    Labels,
}

impl CollectionKind {
    pub const ALL: [CollectionKind; 3] = [
        CollectionKind::Shapes,
        CollectionKind::Decorations,
        CollectionKind::Labels,
    ];

    pub fn title(self) -> &'static str {
        match self {
            CollectionKind::Shapes => "Shapes",
            CollectionKind::Decorations => "Decorations",
            CollectionKind::Labels => "Labels",
        }
    }
}

/// Ordered, append-only group of visual objects. Insertion order is creation
/// order. Every bulk operation touches all current members alike.
#[derive(Debug, Clone)]
pub struct Collection {
    kind: CollectionKind,
    objects: Vec<VisualObject>,
}

impl Collection {
    pub fn new(kind: CollectionKind) -> Self {
        Self {
            kind,
            objects: Vec::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn push(&mut self, object: VisualObject) -> ObjectId {
        let id = object.id;
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&VisualObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut VisualObject> {
        self.objects.iter_mut().find(|o| o.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VisualObject> {
        self.objects.iter()
    }

    pub fn for_each(&mut self, f: impl FnMut(&mut VisualObject)) {
        self.objects.iter_mut().for_each(f);
    }

    /// Overwrite one position axis of every member with `value`.
    pub fn set_axis(&mut self, axis: Axis, value: f32) {
        self.for_each(|o| axis.set(&mut o.transform.position, value));
    }

    /// Set every member's material color. Members without a material are skipped.
    pub fn set_color(&mut self, color: Color) {
        self.for_each(|o| {
            if let Some(material) = &mut o.material {
                material.color = color;
            }
        });
    }

    pub fn set_wireframe(&mut self, wireframe: bool) {
        self.for_each(|o| {
            if let Some(material) = &mut o.material {
                material.wireframe = wireframe;
            }
        });
    }

    /// Start an independent full turn on every member.
    pub fn spin_all(&mut self, duration: f32) {
        self.for_each(|o| o.spin(duration));
    }

    pub fn advance_spins(&mut self, dt: f32) {
        self.for_each(|o| o.advance_spins(dt));
    }

    /// Add `step` radians to every member's x and y rotation.
    pub fn rotate_all(&mut self, step: f32) {
        self.for_each(|o| {
            o.transform.rotation.x += step;
            o.transform.rotation.y += step;
        });
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a VisualObject;
    type IntoIter = std::slice::Iter<'a, VisualObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}
