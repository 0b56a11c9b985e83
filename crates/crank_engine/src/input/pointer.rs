//! Per-node pointer tracking

/// Pointer callback to deliver to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEvent {
    /// Primary button went down over the node
    Down,
    /// Cursor entered the node
    Over,
    /// Cursor left the node
    Out,
    /// Primary button went up after going down over the node
    Up,
}

/// Hover and press state of one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerState {
    hovered: bool,
    active: bool,
}

impl PointerState {
    /// Whether the cursor is over the node
    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Whether the primary button went down over the node and has not been
    /// released yet
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the state for one frame and return the callbacks to fire, in
    /// firing order.
    ///
    /// A release is delivered even when the cursor has left the node, as
    /// long as the press started on it.
    pub fn dispatch(&mut self, inside: bool, pressed: bool, released: bool) -> Vec<MouseEvent> {
        let mut events = Vec::new();

        if inside {
            if pressed {
                events.push(MouseEvent::Down);
                self.active = true;
            }
            if !self.hovered {
                events.push(MouseEvent::Over);
                self.hovered = true;
            }
        } else if self.hovered {
            events.push(MouseEvent::Out);
            self.hovered = false;
        }

        if self.active && released {
            events.push(MouseEvent::Up);
            self.active = false;
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_enter_and_leave() {
        let mut pointer = PointerState::default();

        assert_eq!(pointer.dispatch(true, false, false), vec![MouseEvent::Over]);
        assert!(pointer.is_hovered());
        assert!(pointer.dispatch(true, false, false).is_empty());
        assert_eq!(pointer.dispatch(false, false, false), vec![MouseEvent::Out]);
        assert!(pointer.dispatch(false, false, false).is_empty());
    }

    #[test]
    fn test_click_fires_down_before_over() {
        let mut pointer = PointerState::default();

        assert_eq!(
            pointer.dispatch(true, true, false),
            vec![MouseEvent::Down, MouseEvent::Over]
        );
        assert!(pointer.is_active());
        assert_eq!(pointer.dispatch(true, false, true), vec![MouseEvent::Up]);
        assert!(!pointer.is_active());
    }

    #[test]
    fn test_release_outside_still_fires_up() {
        let mut pointer = PointerState::default();

        pointer.dispatch(true, true, false);
        assert_eq!(
            pointer.dispatch(false, false, true),
            vec![MouseEvent::Out, MouseEvent::Up]
        );
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let mut pointer = PointerState::default();

        assert_eq!(pointer.dispatch(true, false, true), vec![MouseEvent::Over]);
        assert!(!pointer.is_active());
    }
}
