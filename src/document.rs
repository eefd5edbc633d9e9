use std::collections::{BTreeMap, HashMap};

use crate::dom::{PageDom, Rect};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Position of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    pub top: f64,
    pub height: f64,
}

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: HashMap<String, String>,
    styles: BTreeMap<String, String>,
    value: String,
    layout: Layout,
    natural_width: f64,
}

/// In-memory document with just enough layout to drive the controller.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
    root_properties: BTreeMap<String, String>,
    viewport_width: f64,
    viewport_height: f64,
    scroll_y: f64,
}

impl Document {
    pub fn new(viewport_width: f64, viewport_height: f64) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
            root_properties: BTreeMap::new(),
            viewport_width,
            viewport_height,
            scroll_y: 0.0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let attrs = attrs
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), (*value).to_string()))
            .collect::<HashMap<_, _>>();
        let value = attrs.get("value").cloned().unwrap_or_default();
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            styles: BTreeMap::new(),
            value,
            layout: Layout::default(),
            natural_width: 0.0,
        };
        let id = self.create_node(Some(parent), NodeType::Element(element));
        if let Some(id_attr) = self
            .element(id)
            .and_then(|element| element.attrs.get("id").cloned())
        {
            self.id_index.entry(id_attr).or_insert(id);
        }
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.create_node(Some(parent), NodeType::Text(text.to_string()))
    }

    /// Removes `node` from its parent. The subtree keeps its nodes but is no
    /// longer connected, so it cannot be measured or found by id.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
        self.rebuild_id_index();
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|element| element.tag_name.as_str())
    }

    pub fn get_attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|element| element.attrs.get(name))
            .map(String::as_str)
    }

    pub fn class_list(&self, node: NodeId) -> Vec<String> {
        class_tokens(self.get_attr(node, "class"))
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)
            .and_then(|element| element.styles.get(property))
            .map(String::as_str)
    }

    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root_properties.get(name).map(String::as_str)
    }

    pub fn text_content(&self, node: NodeId) -> String {
        match &self.nodes[node.0].node_type {
            NodeType::Text(text) => text.clone(),
            NodeType::Document | NodeType::Element(_) => self.nodes[node.0]
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
        }
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node)
            .ok_or_else(|| Error::Dom("value target is not an element".into()))?;
        if !is_form_control(&element.tag_name) {
            return Err(Error::Dom(format!(
                "value target is <{}>, expected input, textarea or select",
                element.tag_name
            )));
        }
        element.value = value.to_string();
        Ok(())
    }

    pub fn set_layout(&mut self, node: NodeId, top: f64, height: f64) {
        if let Some(element) = self.element_mut(node) {
            element.layout = Layout { top, height };
        }
    }

    pub fn layout(&self, node: NodeId) -> Option<Layout> {
        self.element(node).map(|element| element.layout)
    }

    pub fn set_natural_width(&mut self, node: NodeId, width: f64) {
        if let Some(element) = self.element_mut(node) {
            element.natural_width = width;
        }
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = height;
    }

    /// Moves the scroll position without animation, as a user scroll would.
    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y.max(0.0);
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.nodes[current.0].parent;
        }
        false
    }

    fn create_node(&mut self, parent: Option<NodeId>, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            node_type,
        });
        if let Some(parent_id) = parent {
            self.nodes[parent_id.0].children.push(id);
        }
        id
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn require_element_mut(&mut self, node: NodeId, what: &str) -> Result<&mut Element> {
        self.element_mut(node)
            .ok_or_else(|| Error::Dom(format!("{what} target is not an element")))
    }

    fn collect_elements_dfs(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for child in &self.nodes[node.0].children {
            if self.element(*child).is_some() {
                out.push(*child);
            }
            self.collect_elements_dfs(*child, out);
        }
    }

    fn rebuild_id_index(&mut self) {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        self.id_index.clear();
        for node in ids {
            if let Some(id_attr) = self.get_attr(node, "id").map(str::to_string) {
                self.id_index.entry(id_attr).or_insert(node);
            }
        }
    }

    fn deep_clone(&mut self, source: NodeId, parent: NodeId) {
        let node_type = self.nodes[source.0].node_type.clone();
        let copy = self.create_node(Some(parent), node_type);
        let children = self.nodes[source.0].children.clone();
        for child in children {
            self.deep_clone(child, copy);
        }
    }
}

impl PageDom for Document {
    type Node = NodeId;

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.by_id(id)
    }

    fn elements_with_any_class(&self, classes: &[String]) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);
        ids.into_iter()
            .filter(|node| {
                let tokens = self.class_list(*node);
                tokens.iter().any(|token| classes.iter().any(|class| class == token))
            })
            .collect()
    }

    fn first_descendant_with_tag(&self, node: &NodeId, tag: &str) -> Option<NodeId> {
        let mut ids = Vec::new();
        self.collect_elements_dfs(*node, &mut ids);
        ids.into_iter().find(|candidate| {
            self.tag_name(*candidate)
                .is_some_and(|name| name.eq_ignore_ascii_case(tag))
        })
    }

    fn closest_with_tag(&self, node: &NodeId, tag: &str) -> Option<NodeId> {
        let mut cursor = Some(*node);
        while let Some(current) = cursor {
            if self.tag_name(current).is_some_and(|name| name.eq_ignore_ascii_case(tag)) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cursor = Some(*node);
        while let Some(current) = cursor {
            if current == *ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.get_attr(*node, name).map(str::to_string)
    }

    fn set_attr(&mut self, node: &NodeId, name: &str, value: &str) -> Result<()> {
        let element = self.require_element_mut(*node, "setAttribute")?;
        element.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        if name.eq_ignore_ascii_case("id") {
            self.rebuild_id_index();
        }
        Ok(())
    }

    fn has_class(&self, node: &NodeId, class_name: &str) -> bool {
        self.element(*node).is_some_and(|element| has_class(element, class_name))
    }

    fn add_class(&mut self, node: &NodeId, class_name: &str) -> Result<()> {
        let element = self.require_element_mut(*node, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        set_class_attr(element, &classes);
        Ok(())
    }

    fn remove_class(&mut self, node: &NodeId, class_name: &str) -> Result<()> {
        let element = self.require_element_mut(*node, "classList")?;
        let mut classes = class_tokens(element.attrs.get("class").map(String::as_str));
        classes.retain(|name| name != class_name);
        set_class_attr(element, &classes);
        Ok(())
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<()> {
        let element = self.require_element_mut(*node, "style")?;
        element.styles.insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn set_text(&mut self, node: &NodeId, text: &str) -> Result<()> {
        self.require_element_mut(*node, "textContent")?;
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            self.append_text(*node, text);
        }
        self.rebuild_id_index();
        Ok(())
    }

    fn value(&self, node: &NodeId) -> Option<String> {
        self.element(*node)
            .filter(|element| is_form_control(&element.tag_name))
            .map(|element| element.value.clone())
    }

    fn reset_form(&mut self, form: &NodeId) -> Result<()> {
        let mut ids = Vec::new();
        self.collect_elements_dfs(*form, &mut ids);
        for node in ids {
            if let Some(element) = self.element_mut(node) {
                if is_form_control(&element.tag_name) {
                    element.value = element.attrs.get("value").cloned().unwrap_or_default();
                }
            }
        }
        Ok(())
    }

    fn copy_children(&mut self, from: &NodeId, to: &NodeId) -> Result<()> {
        if self.element(*from).is_none() || self.element(*to).is_none() {
            return Err(Error::Dom("copy_children requires two elements".into()));
        }
        if self.contains(from, to) {
            return Err(Error::Dom("cannot copy a subtree into itself".into()));
        }
        let old = std::mem::take(&mut self.nodes[to.0].children);
        for child in old {
            self.nodes[child.0].parent = None;
        }
        let sources = self.nodes[from.0].children.clone();
        for source in sources {
            self.deep_clone(source, *to);
        }
        self.rebuild_id_index();
        Ok(())
    }

    fn set_root_property(&mut self, name: &str, value: &str) -> Result<()> {
        self.root_properties.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn bounding_rect(&self, node: &NodeId) -> Result<Rect> {
        let element = self
            .element(*node)
            .ok_or_else(|| Error::Layout("measured node is not an element".into()))?;
        if !self.is_connected(*node) {
            return Err(Error::Layout(format!(
                "<{}> is not connected to the document",
                element.tag_name
            )));
        }
        Ok(Rect {
            top: element.layout.top - self.scroll_y,
            height: element.layout.height,
        })
    }

    fn natural_width(&self, node: &NodeId) -> f64 {
        self.element(*node).map(|element| element.natural_width).unwrap_or(0.0)
    }

    fn scroll_into_view(&mut self, node: &NodeId) -> Result<()> {
        let layout = self
            .layout(*node)
            .ok_or_else(|| Error::Dom("scrollIntoView target is not an element".into()))?;
        self.set_scroll_y(layout.top);
        Ok(())
    }

    fn scroll_to(&mut self, top: f64) -> Result<()> {
        self.set_scroll_y(top);
        Ok(())
    }
}

fn is_form_control(tag_name: &str) -> bool {
    matches!(tag_name, "input" | "textarea" | "select")
}

fn has_class(element: &Element, class_name: &str) -> bool {
    element
        .attrs
        .get("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    class_attr
        .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect::<Vec<_>>())
        .unwrap_or_default()
}

fn set_class_attr(element: &mut Element, classes: &[String]) {
    if classes.is_empty() {
        element.attrs.remove("class");
    } else {
        element.attrs.insert("class".to_string(), classes.join(" "));
    }
}
