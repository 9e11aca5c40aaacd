use crate::PanelAction;
use showcase_common::{Axis, Color};
use showcase_scene::config::{
    DECORATION_COLOR, LABEL_COLOR, SHAPE_COLOR, SLIDER_RANGE, SLIDER_STEP,
};
use showcase_scene::{CollectionKind, SceneState};

/// Widget values for one collection's section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollectionControls {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl CollectionControls {
    fn new(color: Color) -> Self {
        Self {
            position: [0.0; 3],
            color: color.to_array(),
        }
    }
}

/// The debug control panel.
#[derive(Debug, Clone)]
pub struct ParameterPanel {
    pub shapes: CollectionControls,
    pub decorations: CollectionControls,
    pub labels: CollectionControls,
    pub wireframe: bool,
    pub visible: bool,
}

impl Default for ParameterPanel {
    fn default() -> Self {
        Self {
            shapes: CollectionControls::new(SHAPE_COLOR),
            decorations: CollectionControls::new(DECORATION_COLOR),
            labels: CollectionControls::new(LABEL_COLOR),
            wireframe: false,
            visible: true,
        }
    }
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    pub fn controls(&self, kind: CollectionKind) -> &CollectionControls {
        match kind {
            CollectionKind::Shapes => &self.shapes,
            CollectionKind::Decorations => &self.decorations,
            CollectionKind::Labels => &self.labels,
        }
    }

    fn controls_mut(&mut self, kind: CollectionKind) -> &mut CollectionControls {
        match kind {
            CollectionKind::Shapes => &mut self.shapes,
            CollectionKind::Decorations => &mut self.decorations,
            CollectionKind::Labels => &mut self.labels,
        }
    }

    /// Draw the panel and collect the actions its widgets produced this frame.
    pub fn draw(&mut self, ctx: &egui::Context, scene: &SceneState) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        if !self.visible {
            return actions;
        }

        egui::Window::new("Debug")
            .default_width(260.0)
            .resizable(false)
            .show(ctx, |ui| {
                for kind in CollectionKind::ALL {
                    egui::CollapsingHeader::new(kind.title())
                        .default_open(true)
                        .show(ui, |ui| {
                            self.draw_section(ui, kind, scene, &mut actions);
                        });
                }
                ui.separator();
                if ui.checkbox(&mut self.wireframe, "wireframe").changed() {
                    actions.push(PanelAction::SetWireframe(self.wireframe));
                }
                ui.separator();
                ui.small("LMB: orbit | Wheel: zoom | H: toggle panel");
            });

        actions
    }

    fn draw_section(
        &mut self,
        ui: &mut egui::Ui,
        kind: CollectionKind,
        scene: &SceneState,
        actions: &mut Vec<PanelAction>,
    ) {
        let controls = self.controls_mut(kind);
        for (i, axis) in Axis::ALL.into_iter().enumerate() {
            let slider = egui::Slider::new(&mut controls.position[i], SLIDER_RANGE)
                .step_by(SLIDER_STEP)
                .text(axis.label());
            if ui.add(slider).changed() {
                actions.push(PanelAction::SetAxis {
                    collection: kind,
                    axis,
                    value: controls.position[i],
                });
            }
        }
        ui.horizontal(|ui| {
            if ui.color_edit_button_rgb(&mut controls.color).changed() {
                actions.push(PanelAction::SetColor {
                    collection: kind,
                    color: Color::from_array(controls.color),
                });
            }
            ui.label("color");
        });
        if ui.button("spin").clicked() {
            actions.push(PanelAction::Spin(kind));
        }
        if kind == CollectionKind::Labels {
            ui.label(format!("count: {}", scene.labels.len()));
        }
    }
}
