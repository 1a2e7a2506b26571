//! Headless element tree.
//!
//! [`Document`] is a small DOM: elements with ids, classes, data attributes,
//! text, form values and a laid-out bounding box, arranged in an
//! [`indextree`] arena. It carries exactly what the widgets read and write and
//! nothing about rendering. Hosts keep `bounds` in sync with their layout.

use indextree::{Arena, NodeId};
use rustc_hash::FxHashMap as HashMap;
use smallvec::SmallVec;
use tracing::trace;

use crate::{
    error::UiError,
    overlay::OverlayLayer,
    px::{PxPosition, PxRect},
};

/// `type` of an `<input>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// Free text.
    Text,
    /// Not rendered; carries a form value.
    Hidden,
    /// Integer entry.
    Number,
    /// Telephone number entry.
    Tel,
    /// Boolean toggle.
    Checkbox,
    /// One-of-many toggle.
    Radio,
}

/// The tag of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `<body>`.
    Body,
    /// `<div>`.
    Div,
    /// `<span>`.
    Span,
    /// `<button>`.
    Button,
    /// `<label>`.
    Label,
    /// `<form>`.
    Form,
    /// `<input>` of the given type.
    Input(InputType),
    /// `<select>`.
    Select,
    /// `<option>` inside a select.
    SelectOption,
}

/// Inline `display` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    /// Not rendered.
    None,
    /// Block layout.
    Block,
    /// Flex layout.
    Flex,
}

/// Inline `position` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// In flow, offset-capable.
    Relative,
    /// Relative to the viewport.
    Fixed,
}

/// Inline `pointer-events` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvents {
    /// Receives input normally.
    Auto,
    /// Transparent to input.
    None,
}

/// Inline style properties. `None` means "not set inline".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementStyle {
    /// `display`.
    pub display: Option<Display>,
    /// `position`.
    pub position: Option<Position>,
    /// `top`, in viewport pixels.
    pub top: Option<crate::px::Px>,
    /// `left`, in viewport pixels.
    pub left: Option<crate::px::Px>,
    /// `z-index`.
    pub z_index: Option<i32>,
    /// `pointer-events`.
    pub pointer_events: Option<PointerEvents>,
}

/// A single element.
#[derive(Debug, Clone)]
pub struct Element {
    kind: ElementKind,
    id: Option<String>,
    classes: SmallVec<[String; 4]>,
    dataset: HashMap<String, String>,
    attributes: HashMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    hidden: bool,
    checked: bool,
    style: ElementStyle,
    bounds: PxRect,
}

impl Element {
    /// Creates an element of the given kind with no attributes.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            classes: SmallVec::new(),
            dataset: HashMap::default(),
            attributes: HashMap::default(),
            text: String::new(),
            value: String::new(),
            disabled: false,
            hidden: false,
            checked: false,
            style: ElementStyle::default(),
            bounds: PxRect::ZERO,
        }
    }

    /// Sets the `id` attribute.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Adds every whitespace-separated class in `classes`.
    pub fn with_class(mut self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the form value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets a `data-*` attribute. `key` is given without the prefix.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dataset.insert(key.into(), value.into());
        self
    }

    /// Sets a plain attribute such as `min`, `max` or `name`.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Sets the checked state.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    /// Sets the laid-out bounds.
    pub fn with_bounds(mut self, bounds: PxRect) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the inline style.
    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    /// The element's tag.
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds `class` if not already present.
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Removes `class` if present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Adds or removes `class` depending on `on`.
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// The class list in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    /// A `data-*` attribute.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.dataset.get(key).map(String::as_str)
    }

    /// Sets a `data-*` attribute.
    pub fn set_data(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.dataset.insert(key.into(), value.into());
    }

    /// A plain attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Text content.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text content.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Form value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the form value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Disabled state.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Sets the disabled state.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// `hidden` attribute.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Sets the `hidden` attribute.
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Checked state of a checkbox or radio.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Sets the checked state.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
    }

    /// Inline style.
    pub fn style(&self) -> &ElementStyle {
        &self.style
    }

    /// Mutable inline style.
    pub fn style_mut(&mut self) -> &mut ElementStyle {
        &mut self.style
    }

    /// Laid-out bounds in viewport space.
    pub fn bounds(&self) -> PxRect {
        self.bounds
    }

    /// Updates the laid-out bounds.
    pub fn set_bounds(&mut self, bounds: PxRect) {
        self.bounds = bounds;
    }

    /// Whether the element renders: not hidden and not `display: none`.
    pub fn is_displayed(&self) -> bool {
        !self.hidden && self.style.display != Some(Display::None)
    }
}

/// The element tree of a page.
#[derive(Debug)]
pub struct Document {
    arena: Arena<Element>,
    body: NodeId,
    ids: HashMap<String, NodeId>,
    overlay: OverlayLayer,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document containing only `<body>`.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let body = arena.new_node(Element::new(ElementKind::Body));
        Self {
            arena,
            body,
            ids: HashMap::default(),
            overlay: OverlayLayer::default(),
        }
    }

    /// The `<body>` element.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Creates a detached element, registering its id.
    pub fn create_element(&mut self, element: Element) -> Result<NodeId, UiError> {
        if let Some(id) = element.id()
            && self.ids.contains_key(id)
        {
            return Err(UiError::DuplicateId { id: id.to_string() });
        }
        let id = element.id.clone();
        let node = self.arena.new_node(element);
        if let Some(id) = id {
            self.ids.insert(id, node);
        }
        Ok(node)
    }

    /// Creates an element and appends it to `parent`.
    pub fn append(&mut self, parent: NodeId, element: Element) -> Result<NodeId, UiError> {
        self.ensure_live(parent)?;
        let node = self.create_element(element)?;
        self.append_child(parent, node)?;
        Ok(node)
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), UiError> {
        self.ensure_live(child)?;
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|_| UiError::UnknownNode(parent))
    }

    /// Inserts `child` into `parent` right before `reference`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), UiError> {
        self.ensure_live(parent)?;
        self.ensure_live(child)?;
        if self.parent(reference) != Some(parent) {
            return Err(UiError::NotAChild {
                parent,
                child: reference,
            });
        }
        reference
            .checked_insert_before(child, &mut self.arena)
            .map_err(|_| UiError::UnknownNode(child))
    }

    /// Removes `node` and its subtree, unregistering ids and overlay entries.
    pub fn remove(&mut self, node: NodeId) -> Result<(), UiError> {
        self.ensure_live(node)?;
        let subtree: Vec<NodeId> = node.descendants(&self.arena).collect();
        for descendant in subtree {
            if let Some(id) = self.arena[descendant].get().id.clone() {
                self.ids.remove(&id);
            }
            self.overlay.remove(descendant);
        }
        node.remove_subtree(&mut self.arena);
        Ok(())
    }

    /// Removes every child of `node`, the equivalent of `innerHTML = ''`.
    pub fn clear_children(&mut self, node: NodeId) -> Result<(), UiError> {
        self.ensure_live(node)?;
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Looks up an element by id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Looks up an element by id, failing with [`UiError::MissingElement`].
    pub fn require(&self, id: &str) -> Result<NodeId, UiError> {
        self.get_element_by_id(id)
            .ok_or_else(|| UiError::MissingElement { id: id.to_string() })
    }

    /// Borrows an element.
    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.arena
            .get(node)
            .filter(|n| !n.is_removed())
            .map(|n| n.get())
    }

    /// Mutably borrows an element.
    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.arena
            .get_mut(node)
            .filter(|n| !n.is_removed())
            .map(|n| n.get_mut())
    }

    /// Runs `f` on the element if it exists. Missing nodes are ignored, which
    /// is what widget code wants for best-effort DOM writes.
    pub fn update(&mut self, node: NodeId, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.element_mut(node) {
            f(element);
        }
    }

    /// Parent of `node`.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).and_then(|n| n.parent())
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        if self.element(node).is_none() {
            return Vec::new();
        }
        node.children(&self.arena).collect()
    }

    /// Inclusive containment, like `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if self.element(node).is_none() {
            return false;
        }
        node.ancestors(&self.arena).any(|a| a == ancestor)
    }

    /// Nearest inclusive ancestor carrying `class`, like `Element.closest`.
    pub fn closest(&self, node: NodeId, class: &str) -> Option<NodeId> {
        if self.element(node).is_none() {
            return None;
        }
        node.ancestors(&self.arena)
            .find(|&a| self.arena[a].get().has_class(class))
    }

    /// All attached elements carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.query_class_within(self.body, class)
    }

    /// Descendants of `scope` (inclusive) carrying `class`, in document order.
    pub fn query_class_within(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        if self.element(scope).is_none() {
            return Vec::new();
        }
        scope
            .descendants(&self.arena)
            .filter(|&n| self.arena[n].get().has_class(class))
            .collect()
    }

    /// Descendants of `scope` (inclusive) whose tag matches `kind`.
    pub fn query_kind_within(&self, scope: NodeId, kind: ElementKind) -> Vec<NodeId> {
        if self.element(scope).is_none() {
            return Vec::new();
        }
        scope
            .descendants(&self.arena)
            .filter(|&n| self.arena[n].get().kind == kind)
            .collect()
    }

    /// The element's laid-out bounds, or an empty rect for unknown nodes.
    pub fn bounding_rect(&self, node: NodeId) -> PxRect {
        self.element(node).map(Element::bounds).unwrap_or_default()
    }

    /// The overlay layer.
    pub fn overlay(&self) -> &OverlayLayer {
        &self.overlay
    }

    /// The overlay layer, mutably.
    pub fn overlay_mut(&mut self) -> &mut OverlayLayer {
        &mut self.overlay
    }

    /// Finds the deepest displayed element under `point`.
    ///
    /// Overlay entries are tested first, topmost first, then the normal flow.
    /// Subtrees lifted into the overlay are skipped during the flow pass.
    pub fn hit_test(&self, point: PxPosition) -> Option<NodeId> {
        for entry in self.overlay.entries().rev() {
            if let Some(hit) = self.hit_node(entry.node, point) {
                trace!(?hit, "hit overlay element");
                return Some(hit);
            }
        }
        self.hit_node(self.body, point)
    }

    fn hit_node(&self, node: NodeId, point: PxPosition) -> Option<NodeId> {
        let element = self.element(node)?;
        if !element.is_displayed() {
            return None;
        }
        let children: Vec<NodeId> = node.children(&self.arena).collect();
        for child in children.into_iter().rev() {
            if self.overlay.contains(child) {
                continue;
            }
            if let Some(hit) = self.hit_node(child, point) {
                return Some(hit);
            }
        }
        element.bounds.contains(point).then_some(node)
    }

    fn ensure_live(&self, node: NodeId) -> Result<(), UiError> {
        self.element(node)
            .map(|_| ())
            .ok_or(UiError::UnknownNode(node))
    }
}
