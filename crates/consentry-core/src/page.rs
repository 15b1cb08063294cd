//! Headless element surface the controller operates against.
//!
//! Models the slice of the DOM contract the banner needs: elements with
//! class lists, lookup by class selector, and click events that can have
//! their default behavior suppressed. No layout, styling, or rendering.

/// Opaque handle to an element within a [`Page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

/// A single element: a tag name, a class list and an optional parent
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    parent: Option<ElementId>,
}

impl Element {
    fn matches(&self, selector: &str) -> bool {
        match selector.strip_prefix('.') {
            Some(class) => self.classes.iter().any(|c| c == class),
            None => self.tag == selector,
        }
    }
}

/// An element arena in document order
#[derive(Debug, Default)]
pub struct Page {
    elements: Vec<Element>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a root-level element
    pub fn add_element(&mut self, tag: &str, classes: &[&str]) -> ElementId {
        self.push(tag, classes, None)
    }

    /// Append a child of an existing element
    pub fn add_child(&mut self, parent: ElementId, tag: &str, classes: &[&str]) -> ElementId {
        self.push(tag, classes, Some(parent))
    }

    fn push(&mut self, tag: &str, classes: &[&str], parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag: tag.to_string(),
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            parent,
        });
        id
    }

    /// First element matching the selector, in document order
    pub fn query(&self, selector: &str) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.matches(selector))
            .map(ElementId)
    }

    /// All descendants of `root` matching the selector, in document order
    pub fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        (0..self.elements.len())
            .map(ElementId)
            .filter(|&id| id != root && self.is_descendant_of(id, root))
            .filter(|&id| self.elements[id.0].matches(selector))
            .collect()
    }

    fn is_descendant_of(&self, id: ElementId, ancestor: ElementId) -> bool {
        let mut current = self.elements[id.0].parent;
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.elements[p.0].parent;
        }
        false
    }

    /// Add a class; re-adding an existing class is a no-op
    pub fn add_class(&mut self, id: ElementId, class: &str) {
        let element = &mut self.elements[id.0];
        if !element.classes.iter().any(|c| c == class) {
            element.classes.push(class.to_string());
        }
    }

    /// Remove a class; removing an absent class is a no-op
    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        self.elements[id.0].classes.retain(|c| c != class);
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.elements[id.0].classes.iter().any(|c| c == class)
    }
}

/// A user activation of a control element
#[derive(Debug, Default)]
pub struct ClickEvent {
    default_prevented: bool,
}

impl ClickEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the element's default behavior (e.g. anchor navigation)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}
