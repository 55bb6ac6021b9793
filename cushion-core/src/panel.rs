//! Tools panel contents, independent of how a front end draws them
use crate::command::{AlignToOrigin, FlipZ};
use crate::scene::SceneObject;

pub const PANEL_TITLE: &str = "Cushion Processing Tools";
pub const PANEL_INTRO: &str =
    "These tools are used to prepare a scanned seat shape for manufacture.";
pub const ALIGN_SECTION: &str = "Scan Alignment";
pub const FLIP_SECTION: &str = "Flip Scan";
pub const FLIP_DESCRIPTION: &str = "This operation reverses the z-direction of the model. \
     Effectively rotating the model 180 degrees around the x/y-axes.";

/// What the tools panel shows for the current active object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub selected_vertices: usize,
    pub align_enabled: bool,
    pub flip_enabled: bool,
    /// Shown under the vertex count while align is disabled
    pub hint: Option<String>,
}

impl PanelState {
    pub fn from_active(active: Option<&SceneObject>) -> Self {
        let selected_vertices = active.map_or(0, SceneObject::selected_count);
        let align_enabled =
            active.is_some() && selected_vertices == AlignToOrigin::REQUIRED_VERTICES;
        let hint = (!align_enabled).then(|| {
            format!(
                "Please select three vertices to use {}.",
                AlignToOrigin::LABEL
            )
        });

        Self {
            selected_vertices,
            align_enabled,
            flip_enabled: active.is_some(),
            hint,
        }
    }

    /// Panel text, one entry per row
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            PANEL_TITLE.to_string(),
            PANEL_INTRO.to_string(),
            String::new(),
            format!("[{ALIGN_SECTION}]"),
            format!("Selected vertices: {}", self.selected_vertices),
        ];
        if let Some(hint) = &self.hint {
            lines.push(hint.clone());
        }
        lines.push(button_line('a', AlignToOrigin::LABEL, self.align_enabled));
        lines.push(String::new());
        lines.push(format!("[{FLIP_SECTION}]"));
        lines.push(FLIP_DESCRIPTION.to_string());
        lines.push(button_line('f', FlipZ::LABEL, self.flip_enabled));
        lines
    }
}

fn button_line(key: char, label: &str, enabled: bool) -> String {
    if enabled {
        format!("({key}) {label}")
    } else {
        format!("( ) {label} (disabled)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;

    #[test]
    fn test_align_enabled_with_three_vertices() {
        let mut object = SceneObject::new("cube", Mesh::cube(1.0));
        object.select(&[0, 1, 2]).unwrap();
        let state = PanelState::from_active(Some(&object));

        assert_eq!(state.selected_vertices, 3);
        assert!(state.align_enabled);
        assert!(state.hint.is_none());
        assert!(state.lines().contains(&"(a) Align To Origin".to_string()));
    }

    #[test]
    fn test_align_disabled_otherwise() {
        let mut object = SceneObject::new("cube", Mesh::cube(1.0));
        object.select(&[0, 1, 2, 4]).unwrap();
        let state = PanelState::from_active(Some(&object));

        assert!(!state.align_enabled);
        assert!(state.flip_enabled);
        assert_eq!(
            state.hint.as_deref(),
            Some("Please select three vertices to use Align To Origin.")
        );
    }

    #[test]
    fn test_no_active_object() {
        let state = PanelState::from_active(None);
        assert_eq!(state.selected_vertices, 0);
        assert!(!state.align_enabled);
        assert!(!state.flip_enabled);
        assert!(state.lines().contains(&"( ) Flip Model (disabled)".to_string()));
    }
}
