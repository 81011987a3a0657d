//! Boundary between the pure session and whatever paints it.
//!
//! A surface draws from the session's read side and gets first look at native input. Input that
//! it does not consume goes through the `InputRouter`, which turns it into key notation and
//! forwards it to the editor.

use crate::{Repaint, Session};
use core_input::{KeyInput, KeyTranslator, MouseInput};
use core_transport::{Transport, TransportError};
use tracing::trace;

pub trait Surface {
    /// Repaint after a batch. The hint says what changed; state is read from `session`.
    fn draw(&mut self, session: &Session, repaint: &Repaint);

    /// Return `false` to keep the key local (IME composition, host shortcuts).
    fn on_key_event(&mut self, _input: &KeyInput) -> bool {
        true
    }

    /// Return `false` to keep the mouse event local.
    fn on_mouse_event(&mut self, _input: &MouseInput) -> bool {
        true
    }
}

/// Surface that paints nothing, for headless runs.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub draws: u64,
}

impl Surface for NullSurface {
    fn draw(&mut self, _session: &Session, _repaint: &Repaint) {
        self.draws += 1;
    }
}

pub struct InputRouter<T> {
    translator: KeyTranslator,
    transport: T,
}

impl<T: Transport> InputRouter<T> {
    pub fn new(translator: KeyTranslator, transport: T) -> Self {
        Self {
            translator,
            transport,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn translator(&self) -> &KeyTranslator {
        &self.translator
    }

    /// Forward a key unless the surface consumed it or it translates to nothing. Returns the
    /// notation that was sent.
    pub fn key(
        &self,
        surface: &mut dyn Surface,
        input: &KeyInput,
    ) -> Result<Option<String>, TransportError> {
        if !surface.on_key_event(input) {
            trace!(target: "input.route", "key_consumed_by_surface");
            return Ok(None);
        }
        let keys = self.translator.translate(input);
        if keys.is_empty() {
            return Ok(None);
        }
        self.transport.send_input(&keys)?;
        Ok(Some(keys))
    }

    /// Mouse events only reach the editor while it has mouse support switched on.
    pub fn mouse(
        &self,
        session: &Session,
        surface: &mut dyn Surface,
        input: &MouseInput,
    ) -> Result<Option<String>, TransportError> {
        if !session.mouse_enabled() {
            return Ok(None);
        }
        if !surface.on_mouse_event(input) {
            trace!(target: "input.route", "mouse_consumed_by_surface");
            return Ok(None);
        }
        let notation = input.translate(self.translator.bindings()).to_input();
        self.transport.send_input(&notation)?;
        Ok(Some(notation))
    }

    /// Ask the editor to resize its grid to what the surface can show.
    pub fn resize(&self, cols: usize, rows: usize) -> Result<(), TransportError> {
        self.transport.request_resize(cols, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::Batch;
    use core_input::{Key, Modifiers, MouseAction, MouseButton, PlatformId};
    use core_transport::LoopbackTransport;
    use serde_json::json;

    struct ImeSurface;

    impl Surface for ImeSurface {
        fn draw(&mut self, _session: &Session, _repaint: &Repaint) {}

        fn on_key_event(&mut self, input: &KeyInput) -> bool {
            input.key != Key::Escape
        }
    }

    fn router() -> InputRouter<LoopbackTransport> {
        InputRouter::new(KeyTranslator::new(PlatformId::Linux), LoopbackTransport::new())
    }

    #[test]
    fn keys_are_translated_and_forwarded() {
        let r = router();
        let mut surface = NullSurface::default();
        let sent = r
            .key(&mut surface, &KeyInput::char('a', Modifiers::CONTROL))
            .unwrap();
        assert_eq!(sent.as_deref(), Some("<C-a>"));
        let bare = KeyInput::new("", Key::Modifier(core_input::ModifierKey::Shift), Modifiers::SHIFT);
        assert_eq!(r.key(&mut surface, &bare).unwrap(), None);
        assert_eq!(r.transport().inputs(), vec!["<C-a>".to_string()]);
    }

    #[test]
    fn surface_can_consume_keys() {
        let r = router();
        let esc = KeyInput::new("\u{1b}", Key::Escape, Modifiers::empty());
        assert_eq!(r.key(&mut ImeSurface, &esc).unwrap(), None);
        assert!(r.transport().inputs().is_empty());
    }

    #[test]
    fn mouse_needs_mouse_on() {
        let r = router();
        let mut session = Session::default();
        let click = MouseInput {
            button: MouseButton::Left,
            action: MouseAction::Press,
            row: 2,
            col: 5,
            modifiers: Modifiers::empty(),
        };
        assert_eq!(r.mouse(&session, &mut NullSurface::default(), &click).unwrap(), None);
        session.apply_batch(&Batch::from_redraw_params(&json!([["mouse_on", []]])).unwrap());
        let sent = r.mouse(&session, &mut NullSurface::default(), &click).unwrap();
        assert_eq!(sent.as_deref(), Some("<LeftMouse><5,2>"));
    }

    #[test]
    fn closed_transport_surfaces_error() {
        let r = router();
        r.transport().close();
        let err = r
            .key(&mut NullSurface::default(), &KeyInput::char('x', Modifiers::empty()))
            .unwrap_err();
        assert_eq!(err, TransportError::Closed);
        assert_eq!(r.resize(80, 24), Err(TransportError::Closed));
    }
}
