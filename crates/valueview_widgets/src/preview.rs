//! Preview
//!
//! A small label showing how the current input will be displayed once
//! parsed. [`Preview`] is the headless widget; [`PreviewExtension`] attaches
//! it to an expert and keeps it in sync with the view state.

use tracing::trace;
use valueview_core::{Node, ViewPort};

use crate::extension::{ExpertExtension, ExtensionContext};

pub const PREVIEW_CLASS: &str = "valueview-preview";
pub const PREVIEW_LABEL_CLASS: &str = "valueview-preview-label";
pub const PREVIEW_VALUE_CLASS: &str = "valueview-preview-value";

/// What a preview currently shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewContent {
    /// Formatted HTML of the parsed value
    Value(String),
    /// Nothing recognizable was entered
    NoValue,
    /// Parsing is still in progress
    Loading,
    /// A parse or format failure message
    Error(String),
}

/// Headless preview widget
#[derive(Debug)]
pub struct Preview {
    root: ViewPort,
    label: String,
    no_value: String,
    loading: String,
    content: PreviewContent,
}

impl Preview {
    /// Build inside `container` with the given texts
    pub fn new(container: &ViewPort, label: String, no_value: String, loading: String) -> Self {
        let root = ViewPort::with_class(PREVIEW_CLASS);
        container.append(Node::Element(root.clone()));
        let preview = Self {
            root,
            label,
            no_value,
            loading,
            content: PreviewContent::NoValue,
        };
        preview.render();
        preview
    }

    /// What the preview currently shows
    pub fn content(&self) -> &PreviewContent {
        &self.content
    }

    pub fn view_port(&self) -> &ViewPort {
        &self.root
    }

    /// Show `html`, or the "no value" text for `None`
    pub fn update(&mut self, html: Option<&str>) {
        self.set(match html {
            Some(html) if !html.is_empty() => PreviewContent::Value(html.to_string()),
            _ => PreviewContent::NoValue,
        });
    }

    /// Show the loading text while a parse is pending
    pub fn show_spinner(&mut self) {
        self.set(PreviewContent::Loading);
    }

    pub fn show_error(&mut self, message: &str) {
        self.set(PreviewContent::Error(message.to_string()));
    }

    fn set(&mut self, content: PreviewContent) {
        if self.content != content {
            self.content = content;
            self.render();
        }
    }

    fn render(&self) {
        let label = ViewPort::with_class(PREVIEW_LABEL_CLASS);
        label.append(Node::Text(self.label.clone()));

        let value = ViewPort::with_class(PREVIEW_VALUE_CLASS);
        value.append(match &self.content {
            PreviewContent::Value(html) => Node::Html(html.clone()),
            PreviewContent::NoValue => Node::Text(self.no_value.clone()),
            PreviewContent::Loading => Node::Text(self.loading.clone()),
            PreviewContent::Error(message) => Node::Html(message.clone()),
        });

        self.root
            .set_content(vec![Node::Element(label), Node::Element(value)]);
    }
}

/// Attaches a [`Preview`] to an expert
#[derive(Debug, Default)]
pub struct PreviewExtension {
    preview: Option<Preview>,
}

impl PreviewExtension {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }
}

impl ExpertExtension for PreviewExtension {
    fn init(&mut self, container: &ViewPort, cx: &ExtensionContext<'_>) {
        self.preview = Some(Preview::new(
            container,
            cx.message("valueview-preview-label", &[]),
            cx.message("valueview-preview-novalue", &[]),
            cx.message("valueview-preview-loading", &[]),
        ));
    }

    fn draw(&mut self, cx: &ExtensionContext<'_>) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        // An error stays until a value is recognized and formatted again.
        let keep_error = matches!(preview.content(), PreviewContent::Error(_))
            && cx.view_state.formatted_value().is_empty();
        if cx.view_state.is_pending() {
            preview.show_spinner();
        } else if !keep_error {
            preview.update(Some(&cx.view_state.formatted_value()));
        }
    }

    fn destroy(&mut self) {
        self.preview = None;
    }

    fn show_error(&mut self, message: &str) -> bool {
        match self.preview.as_mut() {
            Some(preview) => {
                trace!(message, "preview showing error");
                preview.show_error(message);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expert::ExpertBase;
    use crate::testing::{expert_args, FakeViewState};
    use std::rc::Rc;
    use valueview_core::DataValue;

    fn preview_text(extension: &PreviewExtension) -> String {
        extension.preview().unwrap().view_port().text()
    }

    #[test]
    fn test_preview_follows_view_state() {
        let source = Rc::new(FakeViewState::default());
        let base = ExpertBase::new(expert_args(&source));
        let container = ViewPort::new();
        let mut extension = PreviewExtension::new();
        extension.init(&container, &base.extension_context());

        extension.draw(&base.extension_context());
        assert_eq!(
            preview_text(&extension),
            "will be displayed as:no valid value recognized"
        );

        source.set_pending(true);
        extension.draw(&base.extension_context());
        assert_eq!(
            extension.preview().unwrap().content(),
            &PreviewContent::Loading
        );

        source.set_pending(false);
        source.set_value(Some(DataValue::string("x")));
        source.set_formatted("<b>x</b>");
        extension.draw(&base.extension_context());
        assert_eq!(
            extension.preview().unwrap().content(),
            &PreviewContent::Value("<b>x</b>".into())
        );
        assert!(container.render_html().contains("<b>x</b>"));
    }

    #[test]
    fn test_error_survives_redraw_without_value() {
        let source = Rc::new(FakeViewState::default());
        let base = ExpertBase::new(expert_args(&source));
        let mut extension = PreviewExtension::new();
        extension.init(&ViewPort::new(), &base.extension_context());

        assert!(extension.show_error("Malformed input"));
        extension.draw(&base.extension_context());
        assert_eq!(
            extension.preview().unwrap().content(),
            &PreviewContent::Error("Malformed input".into())
        );
    }

    #[test]
    fn test_error_survives_redraw_while_value_is_unformatted() {
        let source = Rc::new(FakeViewState::default());
        let base = ExpertBase::new(expert_args(&source));
        let mut extension = PreviewExtension::new();
        extension.init(&ViewPort::new(), &base.extension_context());

        source.set_value(Some(DataValue::string("2020")));
        assert!(extension.show_error("Format broke"));
        extension.draw(&base.extension_context());
        assert_eq!(
            extension.preview().unwrap().content(),
            &PreviewContent::Error("Format broke".into())
        );

        source.set_formatted("2020");
        extension.draw(&base.extension_context());
        assert_eq!(
            extension.preview().unwrap().content(),
            &PreviewContent::Value("2020".into())
        );
    }

    #[test]
    fn test_show_error_before_init() {
        let mut extension = PreviewExtension::new();
        assert!(!extension.show_error("nowhere to go"));
    }
}
