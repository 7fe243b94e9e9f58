//! Presentation gate.
//!
//! Chooses between a placeholder and the main view based on whether the
//! cart has finished hydrating. The switch is one-way: once the main view
//! has been selected the gate never goes back to the placeholder.

use tokio::sync::watch;
use tracing::debug;

use crate::store::{CartStore, LoadState};
use crate::view::CartView;

/// What the gate wants on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Cart still loading; show the placeholder.
    Placeholder,
    /// Cart just became ready; build the main view now.
    EnterMain,
    /// Main view already built; nothing to do.
    Main,
}

/// Something that can draw the two screens.
pub trait RenderTarget {
    /// Show the loading placeholder.
    fn placeholder(&mut self);

    /// Build the main view tree.
    fn main(&mut self, cart: &CartView);
}

/// One-shot `Loading -> Ready` switch over a [`CartStore`].
#[derive(Debug)]
pub struct PresentationGate {
    store: CartStore,
    load_state: watch::Receiver<LoadState>,
    entered_main: bool,
}

impl PresentationGate {
    #[must_use]
    pub fn new(store: CartStore) -> Self {
        let load_state = store.subscribe();
        Self {
            store,
            load_state,
            entered_main: false,
        }
    }

    /// Whether the main view has been selected.
    #[must_use]
    pub const fn is_main(&self) -> bool {
        self.entered_main
    }

    /// Pick the screen for the current load state.
    ///
    /// Returns [`Selection::EnterMain`] exactly once, the first time the
    /// store is seen ready.
    pub fn select(&mut self) -> Selection {
        if self.entered_main {
            return Selection::Main;
        }
        if *self.load_state.borrow_and_update() == LoadState::Ready {
            self.entered_main = true;
            debug!("Presentation gate entered main view");
            return Selection::EnterMain;
        }
        Selection::Placeholder
    }

    /// Wait for the store to become ready, then select.
    pub async fn wait_ready(&mut self) -> Selection {
        if !self.entered_main {
            // The sender lives in `self.store`, so the channel stays open.
            let _ = self
                .load_state
                .wait_for(|state| *state == LoadState::Ready)
                .await;
        }
        self.select()
    }

    /// Render the placeholder while loading, then the main view once.
    ///
    /// Calling this again after the main view was built renders nothing.
    pub async fn run<R: RenderTarget + ?Sized>(&mut self, target: &mut R) {
        let mut selection = self.select();
        if selection == Selection::Placeholder {
            target.placeholder();
            selection = self.wait_ready().await;
        }
        if selection == Selection::EnterMain {
            target.main(&self.store.view().await);
        }
    }
}
