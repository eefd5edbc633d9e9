use std::fmt;

use crate::Result;

/// Viewport-relative box of an element, as `getBoundingClientRect` reports it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The slice of the document the controller reads and mutates.
///
/// Lookups are infallible and return `None` for missing markup; every
/// mutation may fail on a real backend and reports it as [`crate::Error::Dom`].
pub trait PageDom {
    type Node: Clone + PartialEq + fmt::Debug;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    /// Elements carrying at least one of `classes`, in document order.
    fn elements_with_any_class(&self, classes: &[String]) -> Vec<Self::Node>;

    fn first_descendant_with_tag(&self, node: &Self::Node, tag: &str) -> Option<Self::Node>;

    /// `node` itself or its nearest ancestor with the given tag.
    fn closest_with_tag(&self, node: &Self::Node, tag: &str) -> Option<Self::Node>;

    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    fn attr(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attr(&mut self, node: &Self::Node, name: &str, value: &str) -> Result<()>;

    fn has_class(&self, node: &Self::Node, class_name: &str) -> bool;

    fn add_class(&mut self, node: &Self::Node, class_name: &str) -> Result<()>;

    fn remove_class(&mut self, node: &Self::Node, class_name: &str) -> Result<()>;

    fn toggle_class(&mut self, node: &Self::Node, class_name: &str) -> Result<bool> {
        if self.has_class(node, class_name) {
            self.remove_class(node, class_name)?;
            Ok(false)
        } else {
            self.add_class(node, class_name)?;
            Ok(true)
        }
    }

    fn set_class(&mut self, node: &Self::Node, class_name: &str, on: bool) -> Result<()> {
        if on {
            self.add_class(node, class_name)
        } else {
            self.remove_class(node, class_name)
        }
    }

    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str) -> Result<()>;

    fn set_text(&mut self, node: &Self::Node, text: &str) -> Result<()>;

    /// Current value of a form control; `None` for anything else.
    fn value(&self, node: &Self::Node) -> Option<String>;

    fn reset_form(&mut self, form: &Self::Node) -> Result<()>;

    /// Replaces the children of `to` with a structural copy of the children of `from`.
    fn copy_children(&mut self, from: &Self::Node, to: &Self::Node) -> Result<()>;

    /// Sets a custom property on the root element's inline style.
    fn set_root_property(&mut self, name: &str, value: &str) -> Result<()>;

    fn viewport_width(&self) -> f64;

    fn viewport_height(&self) -> f64;

    /// Equivalent of `matchMedia("(max-width: {px}px)")`.
    fn matches_max_width(&self, px: u32) -> bool {
        self.viewport_width() <= f64::from(px)
    }

    fn scroll_y(&self) -> f64;

    fn bounding_rect(&self, node: &Self::Node) -> Result<Rect>;

    /// Intrinsic width of a loaded image, 0 when it failed to load.
    fn natural_width(&self, node: &Self::Node) -> f64;

    /// Smoothly scrolls `node` to the top of the viewport.
    fn scroll_into_view(&mut self, node: &Self::Node) -> Result<()>;

    /// Smoothly scrolls the window to an absolute vertical offset.
    fn scroll_to(&mut self, top: f64) -> Result<()>;
}
