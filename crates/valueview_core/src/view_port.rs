//! View ports - headless content containers
//!
//! A [`ViewPort`] is the container an expert renders into. It stands in for
//! a DOM node: it carries CSS-like classes and an ordered list of [`Node`]s.
//! Interactive nodes ([`InputElement`], [`SelectElement`]) are shared
//! handles, so the host can simulate user interaction on the same element
//! the expert reads from:
//!
//! ```rust
//! use valueview_core::view_port::{InputElement, Node, ViewPort};
//!
//! let port = ViewPort::new();
//! let input = InputElement::new();
//! port.set_content(vec![Node::Input(input.clone())]);
//!
//! port.find_input().unwrap().type_text("hello");
//! assert_eq!(input.value(), "hello");
//! ```
//!
//! User edits (`type_text`, `choose`) fire the element's listeners;
//! programmatic updates (`set_value`, `select`) do not. Listeners always run
//! after the element's own state is released, so they may read it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::service::escape_html;

type Listener = Rc<dyn Fn(&str)>;

/// A piece of rendered content
#[derive(Clone, Debug)]
pub enum Node {
    /// Plain text
    Text(String),
    /// Pre-rendered markup (formatter output)
    Html(String),
    /// A hyperlink
    Link { href: String, text: String },
    /// A text input
    Input(InputElement),
    /// A single-choice picker
    Select(SelectElement),
    /// A nested container
    Element(ViewPort),
}

// =============================================================================
// ViewPort
// =============================================================================

#[derive(Default)]
struct ViewPortInner {
    classes: SmallVec<[String; 4]>,
    nodes: Vec<Node>,
}

/// Shared handle to a content container
#[derive(Clone, Default)]
pub struct ViewPort {
    inner: Rc<RefCell<ViewPortInner>>,
}

impl ViewPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container carrying `class`
    pub fn with_class(class: &str) -> Self {
        let port = Self::new();
        port.add_class(class);
        port
    }

    pub fn add_class(&self, class: &str) {
        let mut inner = self.inner.borrow_mut();
        if !inner.classes.iter().any(|c| c == class) {
            inner.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.inner.borrow_mut().classes.retain(|c| c != class);
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.inner.borrow().classes.iter().any(|c| c == class)
    }

    pub fn classes(&self) -> Vec<String> {
        self.inner.borrow().classes.to_vec()
    }

    pub fn append(&self, node: Node) {
        self.inner.borrow_mut().nodes.push(node);
    }

    /// Replace all content
    pub fn set_content(&self, nodes: Vec<Node>) {
        self.inner.borrow_mut().nodes = nodes;
    }

    /// Remove all content (classes are kept)
    pub fn empty(&self) {
        self.inner.borrow_mut().nodes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().nodes.is_empty()
    }

    pub fn nodes(&self) -> Vec<Node> {
        self.inner.borrow().nodes.clone()
    }

    /// Whether both handles refer to the same container
    pub fn ptr_eq(&self, other: &ViewPort) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Whether `input` is rendered directly in this container
    pub fn contains_input(&self, input: &InputElement) -> bool {
        self.inner
            .borrow()
            .nodes
            .iter()
            .any(|node| matches!(node, Node::Input(i) if i.ptr_eq(input)))
    }

    /// First input in document order, searching nested containers
    pub fn find_input(&self) -> Option<InputElement> {
        self.find_map(&|node| match node {
            Node::Input(input) => Some(input.clone()),
            _ => None,
        })
    }

    /// First picker in document order, searching nested containers
    pub fn find_select(&self) -> Option<SelectElement> {
        self.find_map(&|node| match node {
            Node::Select(select) => Some(select.clone()),
            _ => None,
        })
    }

    /// First container (this one included) carrying `class`
    pub fn find_by_class(&self, class: &str) -> Option<ViewPort> {
        if self.has_class(class) {
            return Some(self.clone());
        }
        self.nodes().iter().find_map(|node| match node {
            Node::Element(child) => child.find_by_class(class),
            _ => None,
        })
    }

    fn find_map<T>(&self, f: &dyn Fn(&Node) -> Option<T>) -> Option<T> {
        self.nodes().iter().find_map(|node| {
            f(node).or_else(|| match node {
                Node::Element(child) => child.find_map(f),
                _ => None,
            })
        })
    }

    /// Visible text, inputs contributing their current value
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            match node {
                Node::Text(text) | Node::Html(text) => out.push_str(&text),
                Node::Link { text, .. } => out.push_str(&text),
                Node::Input(input) => out.push_str(&input.value()),
                Node::Select(select) => out.push_str(&select.selected_label().unwrap_or_default()),
                Node::Element(child) => out.push_str(&child.text()),
            }
        }
        out
    }

    /// Markup rendering of the content (not including this container)
    pub fn render_html(&self) -> String {
        let mut out = String::new();
        for node in self.nodes() {
            match node {
                Node::Text(text) => out.push_str(&escape_html(&text)),
                Node::Html(html) => out.push_str(&html),
                Node::Link { href, text } => out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape_html(&href),
                    escape_html(&text)
                )),
                Node::Input(input) => out.push_str(&format!(
                    "<input value=\"{}\"{}>",
                    escape_html(&input.value()),
                    if input.is_disabled() { " disabled" } else { "" }
                )),
                Node::Select(select) => out.push_str(&format!(
                    "<select>{}</select>",
                    escape_html(&select.selected_label().unwrap_or_default())
                )),
                Node::Element(child) => out.push_str(&format!(
                    "<div class=\"{}\">{}</div>",
                    child.classes().join(" "),
                    child.render_html()
                )),
            }
        }
        out
    }
}

impl fmt::Debug for ViewPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ViewPort")
            .field("classes", &inner.classes)
            .field("nodes", &inner.nodes)
            .finish()
    }
}

// =============================================================================
// InputElement
// =============================================================================

#[derive(Default)]
struct InputState {
    value: String,
    placeholder: String,
    disabled: bool,
    focused: bool,
    listeners: SmallVec<[Listener; 2]>,
}

/// Shared handle to a text input
#[derive(Clone, Default)]
pub struct InputElement {
    inner: Rc<RefCell<InputState>>,
}

impl InputElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> String {
        self.inner.borrow().value.clone()
    }

    /// Programmatic update; listeners are not notified
    pub fn set_value(&self, value: &str) {
        self.inner.borrow_mut().value = value.to_string();
    }

    /// User edit: replace the value and notify listeners
    ///
    /// Ignored while the input is disabled.
    pub fn type_text(&self, value: &str) {
        let listeners = {
            let mut state = self.inner.borrow_mut();
            if state.disabled {
                return;
            }
            state.value = value.to_string();
            state.listeners.clone()
        };
        for listener in listeners {
            listener(value);
        }
    }

    /// Listen for user edits
    pub fn on_input<F>(&self, listener: F)
    where
        F: Fn(&str) + 'static,
    {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn clear_listeners(&self) {
        self.inner.borrow_mut().listeners.clear();
    }

    pub fn placeholder(&self) -> String {
        self.inner.borrow().placeholder.clone()
    }

    pub fn set_placeholder(&self, placeholder: &str) {
        self.inner.borrow_mut().placeholder = placeholder.to_string();
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        let mut state = self.inner.borrow_mut();
        state.disabled = disabled;
        if disabled {
            state.focused = false;
        }
    }

    pub fn focus(&self) {
        let mut state = self.inner.borrow_mut();
        if !state.disabled {
            state.focused = true;
        }
    }

    pub fn blur(&self) {
        self.inner.borrow_mut().focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.inner.borrow().focused
    }

    pub fn ptr_eq(&self, other: &InputElement) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for InputElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("InputElement")
            .field("value", &state.value)
            .field("disabled", &state.disabled)
            .field("focused", &state.focused)
            .finish()
    }
}

// =============================================================================
// SelectElement
// =============================================================================

/// One choice of a [`SelectElement`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Default)]
struct SelectState {
    options: Vec<SelectOption>,
    selected: Option<usize>,
    disabled: bool,
    listeners: SmallVec<[Listener; 2]>,
}

/// Shared handle to a single-choice picker
#[derive(Clone, Default)]
pub struct SelectElement {
    inner: Rc<RefCell<SelectState>>,
}

impl SelectElement {
    pub fn new(options: Vec<SelectOption>) -> Self {
        let element = Self::default();
        element.inner.borrow_mut().options = options;
        element
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.inner.borrow().options.clone()
    }

    /// Replace the choices, keeping the selection if its value survives
    pub fn set_options(&self, options: Vec<SelectOption>) {
        let mut state = self.inner.borrow_mut();
        let selected = state.selected.map(|i| state.options[i].value.clone());
        state.selected = selected.and_then(|value| options.iter().position(|o| o.value == value));
        state.options = options;
    }

    pub fn selected(&self) -> Option<String> {
        let state = self.inner.borrow();
        state.selected.map(|i| state.options[i].value.clone())
    }

    pub fn selected_label(&self) -> Option<String> {
        let state = self.inner.borrow();
        state.selected.map(|i| state.options[i].label.clone())
    }

    /// Programmatic selection; listeners are not notified
    ///
    /// Returns false if no option has this value.
    pub fn select(&self, value: &str) -> bool {
        let mut state = self.inner.borrow_mut();
        match state.options.iter().position(|o| o.value == value) {
            Some(index) => {
                state.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// User choice: select and notify listeners
    pub fn choose(&self, value: &str) -> bool {
        let listeners = {
            let mut state = self.inner.borrow_mut();
            if state.disabled {
                return false;
            }
            let Some(index) = state.options.iter().position(|o| o.value == value) else {
                return false;
            };
            state.selected = Some(index);
            state.listeners.clone()
        };
        for listener in listeners {
            listener(value);
        }
        true
    }

    pub fn on_change<F>(&self, listener: F)
    where
        F: Fn(&str) + 'static,
    {
        self.inner.borrow_mut().listeners.push(Rc::new(listener));
    }

    pub fn clear_listeners(&self) {
        self.inner.borrow_mut().listeners.clear();
    }

    pub fn is_disabled(&self) -> bool {
        self.inner.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.borrow_mut().disabled = disabled;
    }

    pub fn ptr_eq(&self, other: &SelectElement) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SelectElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("SelectElement")
            .field("options", &state.options.len())
            .field("selected", &state.selected)
            .finish()
    }
}
