//! Discrete input events, queued as they arrive and drained once per frame.

use crate::gray_scott_model::SimulationParams;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Rotate around the volume by a drag of `(dx, dy)` pixels.
    Orbit { dx: f32, dy: f32 },
    /// Move the orbit centre by a drag of `(dx, dy)` pixels.
    Pan { dx: f32, dy: f32 },
    /// Scroll wheel notches; positive zooms in.
    Zoom(f32),
    /// The frame buffer now has this size.
    Resize { width: u32, height: u32 },
    TogglePause,
    Reload,
    /// Replace the simulation parameters from the next step on.
    SetParams(SimulationParams),
    CycleRenderMode,
}

#[derive(Debug, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        // consecutive drags of the same kind collapse into one
        if let Some(last) = self.events.back_mut() {
            match (last, event) {
                (InputEvent::Orbit { dx, dy }, InputEvent::Orbit { dx: ndx, dy: ndy })
                | (InputEvent::Pan { dx, dy }, InputEvent::Pan { dx: ndx, dy: ndy }) => {
                    *dx += ndx;
                    *dy += ndy;
                    return;
                }
                _ => {}
            }
        }
        self.events.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The most recently queued parameter change, if one is still waiting.
    pub fn pending_params(&self) -> Option<SimulationParams> {
        self.events.iter().rev().find_map(|event| match event {
            InputEvent::SetParams(params) => Some(*params),
            _ => None,
        })
    }

    /// Takes every queued event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::TogglePause);
        queue.push(InputEvent::Zoom(1.0));
        queue.push(InputEvent::Reload);

        let events: Vec<_> = queue.drain().collect();
        assert_eq!(
            vec![
                InputEvent::TogglePause,
                InputEvent::Zoom(1.0),
                InputEvent::Reload
            ],
            events
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_pending_params_is_latest() {
        let mut queue = InputQueue::new();
        assert_eq!(None, queue.pending_params());

        let first = SimulationParams::default().with_feed(0.03);
        let second = first.with_kill(0.05);
        queue.push(InputEvent::SetParams(first));
        queue.push(InputEvent::Reload);
        queue.push(InputEvent::SetParams(second));
        queue.push(InputEvent::Zoom(1.0));

        assert_eq!(Some(second), queue.pending_params());
        queue.drain().for_each(drop);
        assert_eq!(None, queue.pending_params());
    }

    #[test]
    fn test_consecutive_drags_merge() {
        let mut queue = InputQueue::new();
        queue.push(InputEvent::Orbit { dx: 1.0, dy: 2.0 });
        queue.push(InputEvent::Orbit { dx: 3.0, dy: -1.0 });
        queue.push(InputEvent::Pan { dx: 1.0, dy: 1.0 });
        queue.push(InputEvent::Orbit { dx: 1.0, dy: 1.0 });

        assert_eq!(3, queue.len());
        assert_eq!(
            Some(InputEvent::Orbit { dx: 4.0, dy: 1.0 }),
            queue.drain().next()
        );
    }
}
