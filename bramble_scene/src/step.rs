// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-step time accumulation and the per-frame driver.

use bramble_index::Damage;

use crate::behavior::{DrawItem, DrawSink};
use crate::config::check_step;
use crate::error::{ConfigError, SceneError};
use crate::tree::Tree;
use crate::types::{Lifecycle, NodeFlags, NodeId};

/// Converts variable frame times into a whole number of fixed update steps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FixedStep {
    step: f64,
    accumulated: f64,
    max_steps: Option<u32>,
}

impl FixedStep {
    /// A stepper that runs one update per `step` seconds.
    ///
    /// Fails with [`ConfigError::InvalidStep`] unless `step` is positive and finite.
    pub fn new(step: f64) -> Result<Self, ConfigError> {
        check_step(step)?;
        Ok(Self::unchecked(step))
    }

    /// `step` must already have passed `check_step`.
    pub(crate) fn unchecked(step: f64) -> Self {
        Self {
            step,
            accumulated: 0.0,
            max_steps: None,
        }
    }

    /// Cap the steps returned by a single [`FixedStep::advance`].
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: Option<u32>) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Add `delta` seconds and return how many steps are now due.
    ///
    /// When the cap is hit, whole steps beyond it are dropped and only the fractional
    /// remainder carries over.
    pub fn advance(&mut self, delta: f64) -> u32 {
        self.accumulated += delta;
        let mut steps = 0;
        while self.accumulated >= self.step {
            if self.max_steps.is_some_and(|max| steps >= max) {
                let dropped = self.accumulated;
                self.accumulated %= self.step;
                log::warn!(
                    "fixed step fell behind: ran {steps} steps, dropped {:.4}s",
                    dropped - self.accumulated
                );
                break;
            }
            self.accumulated -= self.step;
            steps += 1;
        }
        steps
    }

    /// Step length in seconds.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time carried toward the next step.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }

    /// Fraction of a step carried over, for interpolating draws.
    pub fn alpha(&self) -> f64 {
        self.accumulated / self.step
    }
}

/// Summary of one [`Tree::tick`].
#[derive(Clone, Debug)]
pub struct TickReport {
    /// Fixed updates that ran.
    pub steps: u32,
    /// Whether a queued scene change was applied instead of updating.
    pub scene_changed: bool,
    /// Index regions that changed since the previous tick.
    pub damage: Damage<i64>,
}

impl Tree {
    /// Advance the tree by `delta` seconds of frame time.
    ///
    /// Singletons are updated once each, whatever the step count. A queued scene
    /// change is applied next and consumes the frame. Otherwise the scene is updated
    /// once per due fixed step. The spatial index is then committed, and compacted if
    /// the config asks for it.
    pub fn tick(&mut self, delta: f64) -> Result<TickReport, SceneError> {
        for singleton in self.singletons().to_vec() {
            self.update_node(singleton)?;
        }
        let mut steps = 0;
        let scene_changed = if let Some(next) = self.next_scene.take() {
            self.set_scene(next)?;
            true
        } else {
            if let Some(scene) = self.scene() {
                steps = self.stepper.advance(delta);
                for _ in 0..steps {
                    self.update_node(scene)?;
                }
            }
            false
        };
        let damage = if self.config().optimise_index {
            self.index.commit_and_optimize()
        } else {
            self.index.commit()
        };
        Ok(TickReport {
            steps,
            scene_changed,
            damage,
        })
    }

    /// Run exactly one fixed update of the scene, ignoring the stepper.
    pub fn step(&mut self) -> Result<(), SceneError> {
        let scene = self.scene().ok_or(SceneError::NoScene)?;
        self.update_node(scene)
    }

    /// The stepper driving [`tick`](Self::tick).
    pub fn stepper(&self) -> &FixedStep {
        &self.stepper
    }

    /// Update `id` and then its children, depth-first.
    ///
    /// A queued reset replaces the update. Children are visited by live index, so a
    /// child that destroys itself does not cause its next sibling to be skipped.
    pub(crate) fn update_node(&mut self, id: NodeId) -> Result<(), SceneError> {
        let Ok(node) = self.resolve(id) else {
            return Ok(());
        };
        if node.lifecycle().contains(Lifecycle::RESETTING) {
            return self.apply_reset(id);
        }
        if !node.flags().contains(NodeFlags::PROCESSING) {
            return Ok(());
        }
        self.run_hook(id, |b, tree| b.update(tree, id))?;

        let child_at = |tree: &Self, i: usize| {
            tree.resolve(id)
                .ok()
                .and_then(|n| n.children().get(i).copied())
        };
        let mut i = 0;
        while let Some(child) = child_at(self, i) {
            self.update_node(child)?;
            if child_at(self, i) == Some(child) {
                i += 1;
            }
        }

        if self.is_alive(id) {
            self.run_hook(id, |b, tree| b.late_update(tree, id))?;
        }
        Ok(())
    }

    /// Walk the scene, calling each visible node's draw hook before its children's,
    /// then walk the singletons the same way.
    pub fn draw(&self, sink: &mut dyn DrawSink) {
        if let Some(scene) = self.scene() {
            self.draw_node(scene, sink);
        }
        for &singleton in self.singletons() {
            self.draw_node(singleton, sink);
        }
    }

    fn draw_node(&self, id: NodeId, sink: &mut dyn DrawSink) {
        let Ok(node) = self.resolve(id) else {
            return;
        };
        if !node.flags().contains(NodeFlags::VISIBLE) {
            return;
        }
        if let Some(behavior) = node.behavior.as_deref() {
            behavior.draw(self, id, sink);
        }
        for &child in node.children() {
            self.draw_node(child, sink);
        }
    }

    /// The resolved global drawing state of a node.
    pub fn draw_item(&self, id: NodeId) -> Result<DrawItem, SceneError> {
        let node = self.resolve(id)?;
        Ok(DrawItem {
            id,
            position: node.global_position(),
            rotation: node.global_rotation(),
            scale: node.global_scale(),
            depth: node.global_depth(),
            tint: node.global_tint(),
        })
    }
}
