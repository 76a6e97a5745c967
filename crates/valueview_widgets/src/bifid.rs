//! Bifid expert
//!
//! An expert made of two delegates: an editable one used while the view is
//! in edit mode and a static one otherwise. The active delegate is chosen on
//! every draw by [`BifidExpert::reconcile`]; switching destroys the old
//! delegate before the new one is built and hands the raw value across.

use tracing::{debug, warn};
use valueview_core::{Result, ValueCharacteristics};

use crate::expert::{Expert, ExpertArgs, ExpertBase, ExpertConstructor, ExpertInstance, RawValue};

/// Which delegate is live
#[derive(Debug, Default)]
pub enum BifidState {
    #[default]
    Unset,
    Editable(ExpertInstance),
    Static(ExpertInstance),
}

impl BifidState {
    pub fn delegate(&self) -> Option<&ExpertInstance> {
        match self {
            BifidState::Unset => None,
            BifidState::Editable(delegate) | BifidState::Static(delegate) => Some(delegate),
        }
    }

    fn delegate_mut(&mut self) -> Option<&mut ExpertInstance> {
        match self {
            BifidState::Unset => None,
            BifidState::Editable(delegate) | BifidState::Static(delegate) => Some(delegate),
        }
    }

    fn matches(&self, editing: bool) -> bool {
        matches!(
            (self, editing),
            (BifidState::Editable(_), true) | (BifidState::Static(_), false)
        )
    }
}

/// Composite expert switching between an editable and a static delegate
pub struct BifidExpert {
    base: ExpertBase,
    editable: ExpertConstructor,
    static_display: ExpertConstructor,
    state: BifidState,
}

impl BifidExpert {
    pub fn new(
        args: ExpertArgs,
        editable: ExpertConstructor,
        static_display: ExpertConstructor,
    ) -> Self {
        Self {
            base: ExpertBase::new(args),
            editable,
            static_display,
            state: BifidState::Unset,
        }
    }

    /// The live delegate, tagged with its mode
    pub fn state(&self) -> &BifidState {
        &self.state
    }

    /// Make the delegate match `editing`
    ///
    /// Does nothing if the right delegate is already live.
    pub fn reconcile(&mut self, editing: bool) -> Result<()> {
        if self.state.matches(editing) {
            return Ok(());
        }

        let raw = match std::mem::take(&mut self.state) {
            BifidState::Unset => None,
            BifidState::Editable(mut old) | BifidState::Static(mut old) => {
                let raw = old.raw_value();
                old.destroy();
                Some(raw)
            }
        };

        let constructor = if editing {
            self.editable
        } else {
            self.static_display
        };
        let mut delegate = constructor.instantiate(self.base.args());
        delegate.init()?;
        if let Some(raw) = raw {
            delegate.set_raw_value(raw);
        }
        debug!(delegate = constructor.name(), editing, "bifid delegate swapped");

        self.state = if editing {
            BifidState::Editable(delegate)
        } else {
            BifidState::Static(delegate)
        };
        Ok(())
    }

    fn reconcile_with_view(&mut self) {
        let editing = self.base.view_state().is_in_edit_mode();
        if let Err(err) = self.reconcile(editing) {
            warn!(%err, "bifid delegate could not be set up");
        }
    }
}

impl Expert for BifidExpert {
    fn init(&mut self) {
        self.reconcile_with_view();
    }

    fn draw(&mut self) {
        self.reconcile_with_view();
        if let Some(delegate) = self.state.delegate_mut() {
            if let Err(err) = delegate.draw() {
                warn!(%err, "bifid delegate draw failed");
            }
        }
    }

    fn destroy(&mut self) {
        if let Some(delegate) = self.state.delegate_mut() {
            delegate.destroy();
        }
        self.state = BifidState::Unset;
    }

    fn raw_value(&self) -> RawValue {
        self.state
            .delegate()
            .map(ExpertInstance::raw_value)
            .unwrap_or_default()
    }

    fn set_raw_value(&mut self, raw: RawValue) {
        if let Some(delegate) = self.state.delegate_mut() {
            delegate.set_raw_value(raw);
        }
    }

    fn value_characteristics(&self) -> ValueCharacteristics {
        self.state
            .delegate()
            .map(ExpertInstance::value_characteristics)
            .unwrap_or_default()
    }

    fn focus(&mut self) {
        if let Some(delegate) = self.state.delegate_mut() {
            delegate.focus();
        }
    }

    fn blur(&mut self) {
        if let Some(delegate) = self.state.delegate_mut() {
            delegate.blur();
        }
    }

    fn show_error(&mut self, message: &str) -> bool {
        self.state
            .delegate_mut()
            .map(|delegate| delegate.show_error(message))
            .unwrap_or(false)
    }
}
