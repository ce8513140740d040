// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small state machine for driving a behavior from its update hook.

use core::any::Any;

use crate::error::SceneError;
use crate::node::short_type_name;
use crate::tree::Tree;
use crate::types::NodeId;

/// What a state gets to touch while it runs: the owning behavior's data, the tree,
/// and the node the machine belongs to.
#[derive(Debug)]
pub struct Controller<'a, C> {
    /// Data shared by every state of the machine, usually the rest of the behavior.
    pub data: &'a mut C,
    /// The tree the node lives in.
    pub tree: &'a mut Tree,
    /// The node whose behavior owns the machine.
    pub id: NodeId,
}

/// One state of a [`StateMachine`] over controller data `C`.
pub trait State<C>: Any {
    /// Runs when the machine switches into this state.
    fn enter(&mut self, cx: &mut Controller<'_, C>) -> Result<(), SceneError> {
        let _ = cx;
        Ok(())
    }

    /// Runs when the machine switches away from this state.
    fn exit(&mut self, cx: &mut Controller<'_, C>) -> Result<(), SceneError> {
        let _ = cx;
        Ok(())
    }

    /// Runs once per [`StateMachine::process`]. Return the state to switch to, or
    /// `None` to stay.
    fn process(
        &mut self,
        cx: &mut Controller<'_, C>,
    ) -> Result<Option<Box<dyn State<C>>>, SceneError>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Holds the current [`State`] and the one queued to replace it.
///
/// ```
/// use bramble_scene::{Controller, SceneError, State, StateMachine, Tree};
///
/// struct Idle;
/// struct Walk;
///
/// impl State<u32> for Idle {
///     fn process(
///         &mut self,
///         cx: &mut Controller<'_, u32>,
///     ) -> Result<Option<Box<dyn State<u32>>>, SceneError> {
///         Ok((*cx.data > 0).then(|| Box::new(Walk) as Box<dyn State<u32>>))
///     }
/// }
///
/// impl State<u32> for Walk {
///     fn process(
///         &mut self,
///         _: &mut Controller<'_, u32>,
///     ) -> Result<Option<Box<dyn State<u32>>>, SceneError> {
///         Ok(None)
///     }
/// }
///
/// let mut tree = Tree::new();
/// let id = tree.add_singleton(bramble_scene::Node::group("npc")).unwrap();
/// let mut speed = 0;
/// let mut machine = StateMachine::new(Idle);
///
/// machine.process(&mut speed, &mut tree, id).unwrap();
/// assert!(machine.is_in::<Idle>());
/// speed = 2;
/// machine.process(&mut speed, &mut tree, id).unwrap();
/// assert!(machine.is_in::<Walk>());
/// ```
pub struct StateMachine<C> {
    current: Option<Box<dyn State<C>>>,
    next: Option<Box<dyn State<C>>>,
}

impl<C: 'static> core::fmt::Debug for StateMachine<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StateMachine")
            .field("current", &self.current.as_ref().map(|s| s.name()))
            .field("next", &self.next.as_ref().map(|s| s.name()))
            .finish()
    }
}

impl<C> Default for StateMachine<C> {
    fn default() -> Self {
        Self {
            current: None,
            next: None,
        }
    }
}

impl<C: 'static> StateMachine<C> {
    /// A machine that enters `initial` on its first [`process`](Self::process).
    pub fn new(initial: impl State<C>) -> Self {
        let mut machine = Self::default();
        machine.run(initial);
        machine
    }

    /// Queue `next` to be entered at the end of the next [`process`](Self::process).
    ///
    /// A state returned by the current state's own `process` takes precedence.
    pub fn run(&mut self, next: impl State<C>) {
        self.next = Some(Box::new(next));
    }

    /// Process the current state, then switch if a new state is queued.
    ///
    /// A switch exits the old state before entering the new one. Returns whether a
    /// switch happened.
    pub fn process(
        &mut self,
        data: &mut C,
        tree: &mut Tree,
        id: NodeId,
    ) -> Result<bool, SceneError> {
        let mut cx = Controller { data, tree, id };
        if let Some(current) = self.current.as_mut()
            && let Some(next) = current.process(&mut cx)?
        {
            self.next = Some(next);
        }
        let Some(mut next) = self.next.take() else {
            return Ok(false);
        };
        if let Some(mut old) = self.current.take() {
            old.exit(&mut cx)?;
            log::trace!("{id}: state {} -> {}", old.name(), next.name());
        }
        next.enter(&mut cx)?;
        self.current = Some(next);
        Ok(true)
    }

    /// Whether the current state is an `S`.
    pub fn is_in<S: State<C>>(&self) -> bool {
        self.current
            .as_deref()
            .is_some_and(|state| (state as &dyn Any).is::<S>())
    }

    /// Name of the current state, if one has been entered.
    pub fn current_name(&self) -> Option<&'static str> {
        self.current.as_ref().map(|s| s.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use kurbo::{Point, Vec2};

    /// Hook log, plus the flag that sends a patrolling guard into a chase.
    #[derive(Default)]
    struct Guard {
        log: Vec<&'static str>,
        alert: bool,
    }

    struct Patrol;
    struct Chase;

    impl State<Guard> for Patrol {
        fn enter(&mut self, cx: &mut Controller<'_, Guard>) -> Result<(), SceneError> {
            cx.data.log.push("enter patrol");
            Ok(())
        }

        fn exit(&mut self, cx: &mut Controller<'_, Guard>) -> Result<(), SceneError> {
            cx.data.log.push("exit patrol");
            Ok(())
        }

        fn process(
            &mut self,
            cx: &mut Controller<'_, Guard>,
        ) -> Result<Option<Box<dyn State<Guard>>>, SceneError> {
            cx.data.log.push("patrol");
            cx.tree.translate(cx.id, Vec2::new(1.0, 0.0))?;
            Ok(cx.data.alert.then(|| Box::new(Chase) as Box<dyn State<Guard>>))
        }
    }

    impl State<Guard> for Chase {
        fn enter(&mut self, cx: &mut Controller<'_, Guard>) -> Result<(), SceneError> {
            cx.data.log.push("enter chase");
            Ok(())
        }

        fn process(
            &mut self,
            cx: &mut Controller<'_, Guard>,
        ) -> Result<Option<Box<dyn State<Guard>>>, SceneError> {
            cx.data.log.push("chase");
            Ok(None)
        }
    }

    fn guard_tree() -> (Tree, NodeId) {
        let mut tree = Tree::new();
        let root = tree.set_scene(Node::group("root")).unwrap();
        let id = tree.add_child(root, Node::group("guard")).unwrap();
        (tree, id)
    }

    #[test]
    fn first_process_enters_initial_state() {
        let (mut tree, id) = guard_tree();
        let mut guard = Guard::default();
        let mut machine = StateMachine::new(Patrol);
        assert_eq!(machine.current_name(), None);

        assert!(machine.process(&mut guard, &mut tree, id).unwrap());
        assert!(machine.is_in::<Patrol>());
        assert_eq!(guard.log, ["enter patrol"]);
        assert_eq!(tree.resolve(id).unwrap().position(), Point::ORIGIN);
    }

    #[test]
    fn returning_none_stays_and_returning_a_state_switches() {
        let (mut tree, id) = guard_tree();
        let mut guard = Guard::default();
        let mut machine = StateMachine::new(Patrol);
        machine.process(&mut guard, &mut tree, id).unwrap();

        assert!(!machine.process(&mut guard, &mut tree, id).unwrap());
        assert!(machine.is_in::<Patrol>());
        assert_eq!(tree.resolve(id).unwrap().position(), Point::new(1.0, 0.0));

        guard.alert = true;
        guard.log.clear();
        assert!(machine.process(&mut guard, &mut tree, id).unwrap());
        assert!(machine.is_in::<Chase>());
        assert_eq!(machine.current_name(), Some("Chase"));
        assert_eq!(guard.log, ["patrol", "exit patrol", "enter chase"]);
    }

    #[test]
    fn queued_state_is_entered_unless_process_returns_one() {
        let (mut tree, id) = guard_tree();
        let mut guard = Guard::default();
        let mut machine = StateMachine::new(Chase);
        machine.process(&mut guard, &mut tree, id).unwrap();

        machine.run(Patrol);
        guard.log.clear();
        assert!(machine.process(&mut guard, &mut tree, id).unwrap());
        assert_eq!(guard.log, ["chase", "enter patrol"]);

        // Patrol returns Chase when alerted, overriding the queued Patrol.
        guard.alert = true;
        machine.run(Patrol);
        machine.process(&mut guard, &mut tree, id).unwrap();
        assert!(machine.is_in::<Chase>());
    }
}
