// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: handles, lifecycle, propagation, and queries.

use core::any::{Any, TypeId, type_name};

use bramble_index::{Aabb2D, IndexGeneric, QuadTree};
use kurbo::{Affine, Point, Vec2};

use crate::arena::Arena;
use crate::behavior::Behavior;
use crate::camera::Camera;
use crate::collision::Listeners;
use crate::config::TreeConfig;
use crate::error::{ConfigError, SceneError};
use crate::hitbox::point_aabb;
use crate::math::{compose, lerp_angle, snap};
use crate::node::{Node, short_type_name};
use crate::registry::Registry;
use crate::step::FixedStep;
use crate::types::{Lifecycle, NodeFlags, NodeId, Tint};

pub(crate) type SpatialIndex = IndexGeneric<i64, QuadTree<i64>>;

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// The scene tree and everything that runs on it.
///
/// A `Tree` owns the node arena, the generation table, the spatial index, the
/// per-type registries, and the actor and solid instance sets. All of it is plain
/// owned state; there are no globals, so independent trees can coexist.
pub struct Tree {
    nodes: Arena<Node>,
    generations: Vec<u32>, // current generation per slot (persists across frees)
    pub(crate) registry: Registry,
    pub(crate) actors: Vec<NodeId>,
    pub(crate) solids: Vec<NodeId>,
    pub(crate) index: SpatialIndex,
    pub(crate) listeners: Listeners,
    pub(crate) stepper: FixedStep,
    pub(crate) next_scene: Option<Node>,
    scene: Option<NodeId>,
    has_readied_scene: bool,
    singletons: Vec<NodeId>,
    camera: Camera,
    config: TreeConfig,
}

impl core::fmt::Debug for Tree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes_alive", &self.nodes.len())
            .field("slots", &self.nodes.capacity())
            .field("actors", &self.actors.len())
            .field("solids", &self.solids.len())
            .field("indexed", &self.index.len())
            .field("scene", &self.scene)
            .field("singletons", &self.singletons)
            .field("camera", &self.camera)
            .finish_non_exhaustive()
    }
}

impl Tree {
    /// Create an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::build(TreeConfig::default())
    }

    /// Create an empty tree.
    ///
    /// Fails if the config does not [`validate`](TreeConfig::validate).
    pub fn with_config(config: TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: TreeConfig) -> Self {
        let mut index = SpatialIndex::with_backend(QuadTree::new(
            config.world.aabb(),
            config.split_threshold,
            config.max_depth,
        ));
        index.set_capacity_at_least(config.index_capacity);
        Self {
            nodes: Arena::new(),
            generations: Vec::new(),
            registry: Registry::default(),
            actors: Vec::new(),
            solids: Vec::new(),
            index,
            listeners: Listeners::default(),
            stepper: FixedStep::unchecked(config.step_seconds)
                .with_max_steps(config.max_steps_per_frame),
            next_scene: None,
            scene: None,
            has_readied_scene: false,
            singletons: Vec::new(),
            camera: Camera::default(),
            config,
        }
    }

    /// The configuration the tree was built with.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    // --- handles ---

    /// Returns true if `id` refers to a live node.
    ///
    /// See [`NodeId`] docs for the generational semantics.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.generations.get(id.idx()) == Some(&id.1) && self.nodes.has(id.idx())
    }

    /// Borrow a live node.
    ///
    /// Fails with [`SceneError::StaleHandle`] if the node was destroyed, even if its
    /// slot now holds another node.
    pub fn resolve(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.check_generation(id)?;
        self.nodes.get(id.idx())
    }

    pub(crate) fn resolve_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.check_generation(id)?;
        self.nodes.get_mut(id.idx())
    }

    fn check_generation(&self, id: NodeId) -> Result<(), SceneError> {
        match self.generations.get(id.idx()) {
            None => Err(SceneError::SlotEmpty { index: id.idx() }),
            Some(&current) if current != id.1 => Err(SceneError::StaleHandle { id, current }),
            Some(_) => Ok(()),
        }
    }

    /// The live handle for an arena slot, if any.
    pub(crate) fn id_at(&self, idx: usize) -> Option<NodeId> {
        if !self.nodes.has(idx) {
            return None;
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "arena slots are addressed with 32-bit indices"
        )]
        Some(NodeId::new(idx as u32, *self.generations.get(idx)?))
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All live nodes in slot order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().filter_map(|(idx, _)| self.id_at(idx))
    }

    /// Live actors, in the order they became ready.
    pub fn actors(&self) -> &[NodeId] {
        &self.actors
    }

    /// Live solids, in the order they became ready.
    pub fn solids(&self) -> &[NodeId] {
        &self.solids
    }

    // --- scene ---

    /// The current scene root.
    pub fn scene(&self) -> Option<NodeId> {
        self.scene
    }

    /// Replace the scene immediately.
    ///
    /// The old scene is destroyed, which drops its nodes from the registries, and the
    /// new root is attached inactive, set up, and readied along with everything its
    /// setup added. Singletons are left alone.
    pub fn set_scene(&mut self, root: Node) -> Result<NodeId, SceneError> {
        if let Some(old) = self.scene.take() {
            self.destroy(old);
        }
        self.has_readied_scene = false;

        let id = self.attach(root.active(false), None)?;
        self.scene = Some(id);
        self.setup(id)?;
        self.ready(id)?;
        self.has_readied_scene = true;
        log::info!(
            "scene `{}` ready: {} nodes, {} actors, {} solids",
            self.resolve(id).map(Node::name).unwrap_or_default(),
            self.nodes.len(),
            self.actors.len(),
            self.solids.len()
        );
        Ok(id)
    }

    /// Queue a scene change for the start of the next [`tick`](Self::tick).
    ///
    /// Only the first request per tick is kept. Returns `false` if a change was
    /// already queued.
    pub fn change_scene(&mut self, root: Node) -> bool {
        if self.next_scene.is_some() {
            log::debug!("scene change to `{}` ignored: one is already queued", root.name());
            return false;
        }
        self.next_scene = Some(root);
        true
    }

    /// Whether a scene change is queued.
    pub fn has_pending_scene(&self) -> bool {
        self.next_scene.is_some()
    }

    /// Attach a root that lives outside the scene, then set it up and ready it.
    ///
    /// Singletons survive scene changes. [`tick`](Self::tick) updates each one once
    /// per frame before the scene, and [`draw`](Self::draw) draws them after it.
    /// They go away only when destroyed directly.
    pub fn add_singleton(&mut self, node: Node) -> Result<NodeId, SceneError> {
        let id = self.attach(node, None)?;
        self.setup(id)?;
        self.ready(id)?;
        self.singletons.push(id);
        log::debug!(
            "singleton {id} `{}` ready",
            self.resolve(id).map(Node::name).unwrap_or_default()
        );
        Ok(id)
    }

    /// Live singleton roots, in the order they were added.
    pub fn singletons(&self) -> &[NodeId] {
        &self.singletons
    }

    /// Whether the tree `id` belongs to has finished its first ready pass.
    fn root_is_ready(&self, mut id: NodeId) -> bool {
        while let Some(parent) = self.resolve(id).ok().and_then(|n| n.parent) {
            id = parent;
        }
        if self.scene == Some(id) {
            self.has_readied_scene
        } else {
            self.singletons.contains(&id)
        }
    }

    // --- hierarchy ---

    /// Attach `node` under `parent`, run its setup, and ready it if the scene or
    /// singleton it joins is ready.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        let id = self.attach(node, Some(parent))?;
        self.setup(id)?;
        if self.root_is_ready(parent)
            && self
                .resolve(id)
                .is_ok_and(|n| !n.lifecycle.contains(Lifecycle::HAS_READIED))
        {
            self.ready(id)?;
        }
        Ok(id)
    }

    fn attach(&mut self, mut node: Node, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        if let Some(p) = parent {
            if self.resolve(p)?.flags.contains(NodeFlags::PERSISTENT) {
                node.flags.insert(NodeFlags::PERSISTENT);
            }
        }
        node.parent = parent;
        node.lifecycle.insert(Lifecycle::ADDED_TO_TREE);
        let kind = node.kind;
        let idx = self.nodes.add(node);
        if self.generations.len() <= idx {
            self.generations.resize(idx + 1, 0);
        }
        #[allow(
            clippy::cast_possible_truncation,
            reason = "arena slots are addressed with 32-bit indices"
        )]
        let id = NodeId::new(idx as u32, self.generations[idx]);
        self.registry.add(kind, id);
        if let Some(p) = parent {
            self.resolve_mut(p)?.children.push(id);
        }
        self.update_transform(id);
        self.update_depth(id);
        self.update_tint(id);
        log::trace!("attached {id} under {parent:?}");
        Ok(id)
    }

    fn setup(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.resolve_mut(id)?;
        if node.lifecycle.contains(Lifecycle::HAS_SETUP) {
            return Ok(());
        }
        node.lifecycle.insert(Lifecycle::HAS_SETUP);
        self.run_hook(id, |b, tree| b.setup(tree, id))
    }

    /// Compute global state, register bodies, run the ready hook, then ready any
    /// children that have not been readied.
    pub(crate) fn ready(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.resolve_mut(id)?
            .lifecycle
            .insert(Lifecycle::HAS_READIED);
        self.update_transform(id);
        self.update_depth(id);
        self.update_tint(id);
        self.register_body(id);
        self.run_hook(id, |b, tree| b.ready(tree, id))?;
        let Ok(node) = self.resolve(id) else {
            return Ok(());
        };
        for child in node.children.clone() {
            if self
                .resolve(child)
                .is_ok_and(|c| !c.lifecycle.contains(Lifecycle::HAS_READIED))
            {
                self.ready(child)?;
            }
        }
        Ok(())
    }

    fn register_body(&mut self, id: NodeId) {
        let Ok(node) = self.resolve(id) else {
            return;
        };
        let (is_actor, is_solid) = (node.is_actor(), node.is_solid());
        let set = if is_actor {
            &mut self.actors
        } else if is_solid {
            &mut self.solids
        } else {
            return;
        };
        if !set.contains(&id) {
            set.push(id);
        }
    }

    /// Run one behavior hook with the behavior checked out of its node.
    pub(crate) fn run_hook(
        &mut self,
        id: NodeId,
        hook: impl FnOnce(&mut dyn Behavior, &mut Self) -> Result<(), SceneError>,
    ) -> Result<(), SceneError> {
        let Some(mut behavior) = self.resolve_mut(id)?.behavior.take() else {
            return Err(SceneError::BehaviorInUse { id });
        };
        let result = hook(behavior.as_mut(), self);
        // Dropped here if the hook destroyed the node.
        if let Ok(node) = self.resolve_mut(id) {
            node.behavior = Some(behavior);
        }
        result
    }

    /// Destroy a node and its subtree.
    ///
    /// The node leaves the spatial index, its children are destroyed depth-first, it
    /// is detached from its parent and unregistered, its handle is invalidated, and
    /// its slot is freed. Returns `false` if `id` was already stale.
    pub fn destroy(&mut self, id: NodeId) -> bool {
        if !self.is_alive(id) {
            return false;
        }
        self.index.remove(id.idx());
        let children = self
            .nodes
            .get(id.idx())
            .map(|n| n.children.clone())
            .unwrap_or_default();
        for child in children {
            self.destroy(child);
        }

        let parent = self.nodes.get(id.idx()).ok().and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.resolve_mut(p).ok()) {
            p.children.retain(|c| *c != id);
        }
        self.actors.retain(|a| *a != id);
        self.solids.retain(|s| *s != id);
        self.singletons.retain(|s| *s != id);

        let generation = &mut self.generations[id.idx()];
        let node = if let Some(next) = generation.checked_add(1) {
            *generation = next;
            self.nodes.remove(id.idx())
        } else {
            // Out of generations: keep the slot out of circulation.
            self.nodes.retire(id.idx())
        };
        if let Some(node) = node {
            self.registry.try_remove(node.kind, id);
            log::debug!("destroyed {id} `{}`", node.name);
        }
        if self.scene == Some(id) {
            self.scene = None;
            self.has_readied_scene = false;
        }
        true
    }

    /// Destroy `child` if it is a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool, SceneError> {
        if !self.resolve(parent)?.children.contains(&child) {
            return Ok(false);
        }
        Ok(self.destroy(child))
    }

    /// Destroy the first child of `parent` named `name`, returning its now-stale handle.
    pub fn remove_child_named(&mut self, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
        let child = self.child_named(parent, name)?;
        self.destroy(child);
        Ok(child)
    }

    /// Destroy every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) -> Result<(), SceneError> {
        for child in self.resolve(id)?.children.clone() {
            self.destroy(child);
        }
        Ok(())
    }

    /// Queue a reset of `id` for its next update.
    ///
    /// The reset destroys every child not flagged [`NodeFlags::PERSISTENT`], then runs
    /// the node's setup and ready hooks again.
    pub fn reset_children(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.resolve_mut(id)?
            .lifecycle
            .insert(Lifecycle::RESETTING);
        Ok(())
    }

    pub(crate) fn apply_reset(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.resolve_mut(id)?;
        node.lifecycle
            .remove(Lifecycle::RESETTING | Lifecycle::HAS_SETUP | Lifecycle::HAS_READIED);
        let children = node.children.clone();
        let mut doomed = 0;
        for child in children {
            if self
                .resolve(child)
                .is_ok_and(|c| !c.flags.contains(NodeFlags::PERSISTENT))
            {
                self.destroy(child);
                doomed += 1;
            }
        }
        log::debug!("reset {id}: destroyed {doomed} children");
        self.setup(id)?;
        self.ready(id)
    }

    /// Children of `id` in attach order.
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(self.resolve(id)?.children())
    }

    /// Parent of `id`; `None` for the scene root.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.resolve(id)?.parent)
    }

    /// First direct child of `parent` named `name`.
    pub fn child_named(&self, parent: NodeId, name: &str) -> Result<NodeId, SceneError> {
        let node = self.resolve(parent)?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.resolve(c).is_ok_and(|n| n.name == name))
            .ok_or_else(|| SceneError::ChildNotFound {
                parent: node.name.clone(),
                name: name.to_owned(),
            })
    }

    /// First direct child of `parent` whose behavior is `T`.
    pub fn child_of<T: Behavior>(&self, parent: NodeId) -> Result<NodeId, SceneError> {
        let node = self.resolve(parent)?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.is::<T>(c))
            .ok_or_else(|| SceneError::ChildNotFound {
                parent: node.name.clone(),
                name: short_type_name::<T>().to_owned(),
            })
    }

    /// Search the subtree below `root` for a node named `name`.
    ///
    /// Each level's direct children are checked before descending into them.
    pub fn find_named(&self, root: NodeId, name: &str) -> Option<NodeId> {
        let node = self.resolve(root).ok()?;
        node.children
            .iter()
            .copied()
            .find(|&c| self.resolve(c).is_ok_and(|n| n.name == name))
            .or_else(|| node.children.iter().find_map(|&c| self.find_named(c, name)))
    }

    /// Whether `id` is live and its behavior is `T`.
    pub fn is<T: Behavior>(&self, id: NodeId) -> bool {
        self.resolve(id).is_ok_and(|n| n.kind == TypeId::of::<T>())
    }

    /// Borrow a node's behavior as its concrete type.
    pub fn behavior<T: Behavior>(&self, id: NodeId) -> Result<&T, SceneError> {
        let behavior: &dyn Behavior = self
            .resolve(id)?
            .behavior
            .as_deref()
            .ok_or(SceneError::BehaviorInUse { id })?;
        let any: &dyn Any = behavior;
        any.downcast_ref::<T>().ok_or(SceneError::WrongType {
            id,
            expected: type_name::<T>(),
        })
    }

    /// Mutably borrow a node's behavior as its concrete type.
    pub fn behavior_mut<T: Behavior>(&mut self, id: NodeId) -> Result<&mut T, SceneError> {
        let behavior: &mut dyn Behavior = self
            .resolve_mut(id)?
            .behavior
            .as_deref_mut()
            .ok_or(SceneError::BehaviorInUse { id })?;
        let any: &mut dyn Any = behavior;
        any.downcast_mut::<T>().ok_or(SceneError::WrongType {
            id,
            expected: type_name::<T>(),
        })
    }

    // --- local state ---

    /// Set the local position and propagate to the subtree.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), SceneError> {
        let node = self.resolve_mut(id)?;
        node.local.position = position;
        node.dirty.position = true;
        self.update_transform(id);
        Ok(())
    }

    /// Set the local scale and propagate to the subtree.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec2) -> Result<(), SceneError> {
        let node = self.resolve_mut(id)?;
        node.local.scale = scale;
        node.dirty.scale = true;
        self.update_transform(id);
        Ok(())
    }

    /// Set the local rotation in radians and propagate to the subtree.
    pub fn set_rotation(&mut self, id: NodeId, rotation: f64) -> Result<(), SceneError> {
        let node = self.resolve_mut(id)?;
        node.local.rotation = rotation;
        node.dirty.rotation = true;
        self.update_transform(id);
        Ok(())
    }

    /// Set the local depth and propagate to the subtree.
    pub fn set_depth(&mut self, id: NodeId, depth: f64) -> Result<(), SceneError> {
        self.resolve_mut(id)?.local.depth = depth;
        self.update_depth(id);
        Ok(())
    }

    /// Set the local tint and propagate to the subtree.
    pub fn set_tint(&mut self, id: NodeId, tint: Tint) -> Result<(), SceneError> {
        self.resolve_mut(id)?.local.tint = tint;
        self.update_tint(id);
        Ok(())
    }

    /// Move by `delta` in local space.
    pub fn translate(&mut self, id: NodeId, delta: Vec2) -> Result<(), SceneError> {
        let position = self.resolve(id)?.local.position;
        self.set_position(id, position + delta)
    }

    /// Add `amount` radians to the local rotation.
    pub fn rotate(&mut self, id: NodeId, amount: f64) -> Result<(), SceneError> {
        let rotation = self.resolve(id)?.local.rotation;
        self.set_rotation(id, rotation + amount)
    }

    /// Multiply the local scale per axis.
    pub fn scale_by(&mut self, id: NodeId, factor: Vec2) -> Result<(), SceneError> {
        let scale = self.resolve(id)?.local.scale;
        self.set_scale(id, Vec2::new(scale.x * factor.x, scale.y * factor.y))
    }

    /// Turn toward a world point; `speed` in `0..=1` is the fraction of the remaining
    /// angle covered by this call.
    pub fn look_at(&mut self, id: NodeId, target: Point, speed: f64) -> Result<(), SceneError> {
        let node = self.resolve(id)?;
        let heading = (target - node.global_position()).atan2();
        let rotation = lerp_angle(node.local.rotation, heading, speed);
        self.set_rotation(id, rotation)
    }

    /// Rename a node.
    pub fn set_name(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        self.resolve_mut(id)?.name = name.into();
        Ok(())
    }

    /// Add or remove the node from the spatial index.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), SceneError> {
        self.resolve_mut(id)?.active = active;
        if active {
            self.update_bounds(id);
        } else {
            self.index.remove(id.idx());
        }
        Ok(())
    }

    /// Replace all flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), SceneError> {
        self.resolve_mut(id)?.flags = flags;
        Ok(())
    }

    /// Enable or disable updates for the node's subtree.
    pub fn set_processing(&mut self, id: NodeId, processing: bool) -> Result<(), SceneError> {
        self.resolve_mut(id)?
            .flags
            .set(NodeFlags::PROCESSING, processing);
        Ok(())
    }

    /// Enable or disable drawing for the node's subtree.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> Result<(), SceneError> {
        self.resolve_mut(id)?.flags.set(NodeFlags::VISIBLE, visible);
        Ok(())
    }

    /// Set whether the node survives its parent's [`reset_children`](Self::reset_children).
    pub fn set_persistent(&mut self, id: NodeId, persistent: bool) -> Result<(), SceneError> {
        self.resolve_mut(id)?
            .flags
            .set(NodeFlags::PERSISTENT, persistent);
        Ok(())
    }

    /// Enable or disable collisions against a hitbox.
    pub fn set_collidable(&mut self, id: NodeId, collidable: bool) -> Result<(), SceneError> {
        let body = self
            .resolve_mut(id)?
            .body
            .as_mut()
            .ok_or(SceneError::NotAHitbox { id })?;
        body.hitbox.collidable = collidable;
        Ok(())
    }

    // --- propagation ---

    /// Recompute the global transform of `id` and its subtree, refreshing index
    /// entries of active nodes.
    pub(crate) fn update_transform(&mut self, id: NodeId) {
        let Ok(node) = self.resolve(id) else {
            return;
        };
        let parent_transform = node
            .parent
            .and_then(|p| self.resolve(p).ok())
            .map_or(Affine::IDENTITY, |p| p.world.transform);
        let Ok(node) = self.resolve_mut(id) else {
            return;
        };
        node.refresh_local_transform();
        node.world.transform = parent_transform * node.world.local_transform;
        let active = node.active;
        let children = node.children.clone();
        if active {
            self.update_bounds(id);
        }
        for child in children {
            self.update_transform(child);
        }
    }

    pub(crate) fn update_depth(&mut self, id: NodeId) {
        let Ok(node) = self.resolve(id) else {
            return;
        };
        let parent_depth = node
            .parent
            .and_then(|p| self.resolve(p).ok())
            .map_or(0.0, |p| p.world.depth);
        let zoom = self.camera.zoom;
        let Ok(node) = self.resolve_mut(id) else {
            return;
        };
        node.world.depth = node.local.depth / zoom + parent_depth;
        for child in node.children.clone() {
            self.update_depth(child);
        }
    }

    pub(crate) fn update_tint(&mut self, id: NodeId) {
        let Ok(node) = self.resolve(id) else {
            return;
        };
        let parent_tint = node
            .parent
            .and_then(|p| self.resolve(p).ok())
            .map_or(Tint::WHITE, |p| p.world.tint);
        let Ok(node) = self.resolve_mut(id) else {
            return;
        };
        node.world.tint = node.local.tint.multiply(parent_tint);
        for child in node.children.clone() {
            self.update_tint(child);
        }
    }

    fn update_bounds(&mut self, id: NodeId) {
        if let Ok(node) = self.resolve(id) {
            let aabb = node_aabb(node);
            self.index.insert_or_update(id.idx(), aabb);
        }
    }

    // --- geometry queries ---

    /// The node's integer world box: its hitbox, or a zero-size box at its position.
    pub fn aabb(&self, id: NodeId) -> Result<Aabb2D<i64>, SceneError> {
        Ok(node_aabb(self.resolve(id)?))
    }

    /// The box `id` would have at local `position`, everything else unchanged.
    pub fn aabb_at(&self, id: NodeId, position: Point) -> Result<Aabb2D<i64>, SceneError> {
        let node = self.resolve(id)?;
        let parent_transform = node
            .parent
            .and_then(|p| self.resolve(p).ok())
            .map_or(Affine::IDENTITY, |p| p.world.transform);
        let global =
            parent_transform * compose(position, node.local.rotation, node.local.scale);
        Ok(match &node.body {
            Some(body) => body.hitbox.aabb(global),
            None => point_aabb(global),
        })
    }

    /// Union of the boxes of `id` and all its descendants.
    pub fn subtree_aabb(&self, id: NodeId) -> Result<Aabb2D<i64>, SceneError> {
        let node = self.resolve(id)?;
        let mut out = node_aabb(node);
        for &child in &node.children {
            out = out.union(&self.subtree_aabb(child)?);
        }
        Ok(out)
    }

    /// Strict overlap of two nodes' boxes.
    pub fn overlaps(&self, a: NodeId, b: NodeId) -> Result<bool, SceneError> {
        Ok(self.aabb(a)?.overlaps(&self.aabb(b)?))
    }

    /// Other live nodes with behavior `T` whose boxes strictly overlap `id`'s.
    pub fn overlapping_of<T: Behavior>(&self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mine = self.aabb(id)?;
        Ok(self
            .nodes_of::<T>()
            .iter()
            .filter(|&other| other != id)
            .filter(|&other| self.aabb(other).is_ok_and(|b| b.overlaps(&mine)))
            .collect())
    }

    /// Active nodes whose boxes touch `rect`, in slot order.
    pub fn query_rect(&self, rect: Aabb2D<i64>) -> Vec<NodeId> {
        self.index
            .query_rect(rect)
            .filter_map(|k| self.id_at(k))
            .collect()
    }

    /// First active node whose box contains `point`, optionally matching a name and
    /// skipping one node.
    pub fn get_at(
        &self,
        point: Point,
        name: Option<&str>,
        exclude: Option<NodeId>,
    ) -> Option<NodeId> {
        self.index
            .query_point(snap(point.x), snap(point.y))
            .filter_map(|k| self.id_at(k))
            .filter(|&id| Some(id) != exclude)
            .find(|&id| {
                name.is_none_or(|name| self.resolve(id).is_ok_and(|n| n.name == name))
            })
    }

    /// Map a world point into the node's local space.
    pub fn point_to_local(&self, id: NodeId, point: Point) -> Result<Point, SceneError> {
        Ok(self.resolve(id)?.world.transform.inverse() * point)
    }

    /// Map a point in the node's local space to world space.
    pub fn point_to_global(&self, id: NodeId, point: Point) -> Result<Point, SceneError> {
        Ok(self.resolve(id)?.world.transform * point)
    }

    // --- camera ---

    /// The camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Replace the camera, refreshing global depths if the zoom changed.
    pub fn set_camera(&mut self, camera: Camera) {
        let rezoom = camera.zoom != self.camera.zoom;
        self.camera = camera;
        if rezoom {
            if let Some(scene) = self.scene {
                self.update_depth(scene);
            }
        }
    }
}

pub(crate) fn node_aabb(node: &Node) -> Aabb2D<i64> {
    match &node.body {
        Some(body) => body.hitbox.aabb(node.world.transform),
        None => point_aabb(node.world.transform),
    }
}
