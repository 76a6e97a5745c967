//! Expert extensions
//!
//! Cross-cutting add-ons (preview, unit selector, language selector,
//! precision/calendar rotators) are mixed into otherwise unrelated experts
//! through composition: an expert owns an [`ExpertExtender`], which owns an
//! ordered list of [`ExpertExtension`]s and calls their hooks in
//! registration order. Every hook has a no-op default, so an extension only
//! implements what it needs.

use std::fmt;

use smallvec::SmallVec;
use valueview_core::{InputElement, Node, Notifier, ValueCharacteristics, ViewPort};

use crate::expert::ExpertOptions;
use crate::view_state::ViewState;

/// Class of the container holding all extensions of one expert
pub const EXTENDER_CLASS: &str = "valueview-expertextender";

/// Class of each extension's own container
pub const EXTENSION_CLASS: &str = "valueview-expertextender-extension";

/// Bindings an extension may read from its expert
#[derive(Clone, Copy)]
pub struct ExtensionContext<'a> {
    pub view_state: &'a ViewState,
    pub notifier: &'a Notifier,
    pub options: &'a ExpertOptions,
}

impl ExtensionContext<'_> {
    /// Resolve a message, falling back to the key itself
    pub fn message(&self, key: &str, params: &[&str]) -> String {
        self.options
            .message_provider
            .get_message(key, params)
            .unwrap_or_else(|| key.to_string())
    }
}

/// Optional hooks an extension can implement
pub trait ExpertExtension {
    /// Called once with the extension's own container
    fn init(&mut self, _container: &ViewPort, _cx: &ExtensionContext<'_>) {}

    /// Called on the first draw only
    fn on_initial_show(&mut self, _cx: &ExtensionContext<'_>) {}

    /// Called after the expert's own render
    fn draw(&mut self, _cx: &ExtensionContext<'_>) {}

    /// Called when the view pushed a new value into the expert
    fn on_value_set(&mut self, _cx: &ExtensionContext<'_>) {}

    fn destroy(&mut self) {}

    /// Parser options contributed by this extension
    fn value_characteristics(&self) -> ValueCharacteristics {
        ValueCharacteristics::new()
    }

    /// Show a failure message; returns whether it was shown
    fn show_error(&mut self, _message: &str) -> bool {
        false
    }
}

/// An input plus the extensions attached to it
pub struct ExpertExtender {
    input: InputElement,
    container: ViewPort,
    extensions: SmallVec<[Box<dyn ExpertExtension>; 4]>,
    shown: bool,
}

impl ExpertExtender {
    pub fn new(input: InputElement) -> Self {
        Self {
            input,
            container: ViewPort::with_class(EXTENDER_CLASS),
            extensions: SmallVec::new(),
            shown: false,
        }
    }

    /// Builder-style registration
    pub fn with(mut self, extension: Box<dyn ExpertExtension>) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn input(&self) -> &InputElement {
        &self.input
    }

    /// Container holding the extensions' own containers
    pub fn container(&self) -> &ViewPort {
        &self.container
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Give each extension a container and initialise it
    pub fn init(&mut self, cx: &ExtensionContext<'_>) {
        for extension in self.extensions.iter_mut() {
            let container = ViewPort::with_class(EXTENSION_CLASS);
            self.container.append(Node::Element(container.clone()));
            extension.init(&container, cx);
        }
    }

    pub fn draw(&mut self, cx: &ExtensionContext<'_>) {
        if !self.shown {
            self.shown = true;
            for extension in self.extensions.iter_mut() {
                extension.on_initial_show(cx);
            }
        }
        for extension in self.extensions.iter_mut() {
            extension.draw(cx);
        }
    }

    /// Let each extension pick up a value set from outside
    pub fn value_set(&mut self, cx: &ExtensionContext<'_>) {
        for extension in self.extensions.iter_mut() {
            extension.on_value_set(cx);
        }
    }

    pub fn destroy(&mut self) {
        for extension in self.extensions.iter_mut() {
            extension.destroy();
        }
        self.extensions.clear();
        self.container.empty();
        self.shown = false;
    }

    /// Characteristics of all extensions, later registrations winning
    pub fn value_characteristics(&self) -> ValueCharacteristics {
        let mut characteristics = ValueCharacteristics::new();
        for extension in &self.extensions {
            characteristics.merge(extension.value_characteristics());
        }
        characteristics
    }

    /// Offer the message to each extension until one shows it
    pub fn show_error(&mut self, message: &str) -> bool {
        self.extensions
            .iter_mut()
            .any(|extension| extension.show_error(message))
    }
}

impl fmt::Debug for ExpertExtender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpertExtender")
            .field("extensions", &self.extensions.len())
            .field("shown", &self.shown)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expert::ExpertBase;
    use crate::testing::{expert_args, FakeViewState};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records every hook it sees
    struct Recorder {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        characteristic: Option<(&'static str, &'static str)>,
    }

    impl ExpertExtension for Recorder {
        fn init(&mut self, container: &ViewPort, _cx: &ExtensionContext<'_>) {
            assert!(container.has_class(EXTENSION_CLASS));
            self.log.borrow_mut().push(format!("{}:init", self.name));
        }

        fn on_initial_show(&mut self, _cx: &ExtensionContext<'_>) {
            self.log.borrow_mut().push(format!("{}:show", self.name));
        }

        fn draw(&mut self, _cx: &ExtensionContext<'_>) {
            self.log.borrow_mut().push(format!("{}:draw", self.name));
        }

        fn on_value_set(&mut self, _cx: &ExtensionContext<'_>) {
            self.log.borrow_mut().push(format!("{}:value", self.name));
        }

        fn destroy(&mut self) {
            self.log.borrow_mut().push(format!("{}:destroy", self.name));
        }

        fn value_characteristics(&self) -> ValueCharacteristics {
            match self.characteristic {
                Some((key, value)) => ValueCharacteristics::new().with(key, value),
                None => ValueCharacteristics::new(),
            }
        }
    }

    /// Implements nothing but the trait itself
    struct Inert;

    impl ExpertExtension for Inert {}

    fn recorder(
        name: &'static str,
        log: &Rc<RefCell<Vec<String>>>,
        characteristic: Option<(&'static str, &'static str)>,
    ) -> Box<dyn ExpertExtension> {
        Box::new(Recorder {
            name,
            log: log.clone(),
            characteristic,
        })
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let source = Rc::new(FakeViewState::default());
        let base = ExpertBase::new(expert_args(&source));
        let log = Rc::new(RefCell::new(Vec::new()));

        let mut extender = ExpertExtender::new(InputElement::new())
            .with(recorder("a", &log, None))
            .with(Box::new(Inert))
            .with(recorder("b", &log, None));

        extender.init(&base.extension_context());
        extender.draw(&base.extension_context());
        extender.value_set(&base.extension_context());
        extender.draw(&base.extension_context());
        extender.destroy();

        assert_eq!(
            *log.borrow(),
            vec![
                "a:init", "b:init", "a:show", "b:show", "a:draw", "b:draw", "a:value", "b:value",
                "a:draw", "b:draw", "a:destroy", "b:destroy",
            ]
        );
        assert!(extender.container().is_empty());
    }

    #[test]
    fn test_characteristics_are_merged() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let extender = ExpertExtender::new(InputElement::new())
            .with(recorder("a", &log, Some(("unit", "1"))))
            .with(recorder("b", &log, Some(("language", "de"))));

        let characteristics = extender.value_characteristics();
        assert_eq!(characteristics.get_str("unit"), Some("1"));
        assert_eq!(characteristics.get_str("language"), Some("de"));
    }

    #[test]
    fn test_show_error_without_taker() {
        let mut extender = ExpertExtender::new(InputElement::new()).with(Box::new(Inert));
        assert!(!extender.show_error("broken"));
    }
}
