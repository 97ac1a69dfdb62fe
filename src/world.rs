use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::{Rc, Weak};
use std::time::Instant;

use log::{debug, trace};

use crate::api::{ContactListener, PhysicsWorldApi};
use crate::body::Body;
use crate::collider::Collider;
use crate::contact::{Contact, ContactBody};
use crate::error::{PhysicsError, Result};
use crate::geometry::Rectangle;
use crate::quadtree::{QuadEntry, QuadTree, ROOT};
use crate::storage::SlotStorage;
use crate::types::*;

/// Owns bodies, colliders and the broadphase, and runs the step pipeline.
pub struct PhysicsWorld {
    pub cfg: WorldConfig,

    bodies: SlotStorage<Body, BodyRef>,
    colliders: SlotStorage<Collider, ColliderRef>,

    // Rebuilt from scratch every step
    quadtree: QuadTree,

    // Trigger pairs overlapping as of the last step
    trigger_pairs: HashSet<ColliderRefPair>,

    listener: Option<Weak<RefCell<dyn ContactListener>>>,

    last_stats: WorldStats,
    last_timing: Option<WorldTiming>,
}

impl PhysicsWorldApi for PhysicsWorld {
    fn new(cfg: WorldConfig) -> Result<Self> {
        let quadtree = QuadTree::new(&cfg.quadtree)?;
        let mut world = Self {
            cfg,
            bodies: SlotStorage::default(),
            colliders: SlotStorage::default(),
            quadtree,
            trigger_pairs: HashSet::new(),
            listener: None,
            last_stats: WorldStats::default(),
            last_timing: None,
        };
        world.set_up(world.cfg.initial_capacity);
        Ok(world)
    }

    fn set_up(&mut self, initial_capacity: usize) {
        debug!("world set up with {} slots", initial_capacity);
        self.bodies = SlotStorage::with_capacity(initial_capacity);
        self.colliders = SlotStorage::with_capacity(initial_capacity);
        self.trigger_pairs.clear();
    }

    fn tear_down(&mut self) {
        debug!("world tear down");
        self.bodies.clear();
        self.colliders.clear();
        self.trigger_pairs.clear();
        self.last_stats = WorldStats::default();
        self.last_timing = None;
    }

    fn create_body(&mut self) -> BodyRef {
        self.bodies.claim().0
    }

    fn body(&self, body: BodyRef) -> Result<&Body> {
        self.bodies.get(body).ok_or(PhysicsError::BodyNotFound(body))
    }

    fn body_mut(&mut self, body: BodyRef) -> Result<&mut Body> {
        self.bodies.get_mut(body).ok_or(PhysicsError::BodyNotFound(body))
    }

    fn destroy_body(&mut self, body: BodyRef) -> Result<()> {
        self.bodies.release(body).ok_or(PhysicsError::BodyNotFound(body))
    }

    fn create_collider(&mut self, body: BodyRef) -> Result<ColliderRef> {
        let position = self.body(body)?.position;
        let (handle, collider) = self.colliders.claim();
        collider.body = body;
        collider.body_position = position;
        Ok(handle)
    }

    fn collider(&self, collider: ColliderRef) -> Result<&Collider> {
        self.colliders.get(collider).ok_or(PhysicsError::ColliderNotFound(collider))
    }

    fn collider_mut(&mut self, collider: ColliderRef) -> Result<&mut Collider> {
        self.colliders
            .get_mut(collider)
            .ok_or(PhysicsError::ColliderNotFound(collider))
    }

    fn destroy_collider(&mut self, collider: ColliderRef) -> Result<()> {
        self.colliders
            .release(collider)
            .ok_or(PhysicsError::ColliderNotFound(collider))?;
        self.trigger_pairs.retain(|p| p.a != collider && p.b != collider);
        Ok(())
    }

    fn update(&mut self, dt: f32) -> Result<()> {
        let t_all = if self.cfg.enable_timing { Some(Instant::now()) } else { None };

        let t0 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        self.integrate(dt);
        let integrate_ms = t0.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        let t1 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        self.rebuild_index()?;
        let rebuild_index_ms = t1.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        let t2 = if self.cfg.enable_timing { Some(Instant::now()) } else { None };
        self.collision_pass()?;
        let collision_pass_ms = t2.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0);

        if let Some(t_all) = t_all {
            self.last_timing = Some(WorldTiming {
                update_ms: t_all.elapsed().as_secs_f64() * 1000.0,
                integrate_ms,
                rebuild_index_ms,
                collision_pass_ms,
            });
        }
        trace!(
            "step dt={}: {} leaves, {} candidate pairs",
            dt, self.last_stats.leaves, self.last_stats.candidate_pairs
        );
        Ok(())
    }

    fn set_contact_listener<L>(&mut self, listener: &Rc<RefCell<L>>)
    where
        L: ContactListener + 'static,
    {
        debug!("contact listener installed");
        let weak: Weak<RefCell<L>> = Rc::downgrade(listener);
        self.listener = Some(weak);
    }

    fn clear_contact_listener(&mut self) {
        debug!("contact listener cleared");
        self.listener = None;
    }

    fn overlap(&self, a: ColliderRef, b: ColliderRef) -> Result<bool> {
        self.overlap_colliders(self.collider(a)?, self.collider(b)?)
    }
}

impl PhysicsWorld {
    fn integrate(&mut self, dt: f32) {
        for body in self.bodies.slots_mut() {
            body.integrate(dt);
        }
    }

    /// Refresh cached collider positions, then refill the quadtree with a
    /// root spanning every attached collider.
    fn rebuild_index(&mut self) -> Result<()> {
        let mut root = Rectangle::inverted();
        for collider in self.colliders.slots_mut() {
            if !collider.is_attached() {
                continue;
            }
            let body = self
                .bodies
                .get(collider.body)
                .ok_or(PhysicsError::BodyNotFound(collider.body))?;
            collider.body_position = body.position;
            root = root.union(&collider.bounds());
        }

        self.quadtree.set_up_root(root);
        for (handle, collider) in self.colliders.iter() {
            self.quadtree.insert(
                ROOT,
                QuadEntry {
                    aabb: collider.bounds(),
                    collider: handle,
                },
            );
        }
        Ok(())
    }

    fn collision_pass(&mut self) -> Result<()> {
        let mut stats = WorldStats {
            bodies: self.bodies.len(),
            colliders: self.colliders.len(),
            ..Default::default()
        };
        // Detach the tree so leaves can be read while bodies are mutated.
        let tree = std::mem::take(&mut self.quadtree);
        let result = self.visit_node(&tree, ROOT, &mut stats);
        self.quadtree = tree;
        self.last_stats = stats;
        result
    }

    fn visit_node(&mut self, tree: &QuadTree, index: usize, stats: &mut WorldStats) -> Result<()> {
        let node = tree.node(index);
        if let Some(children) = node.children() {
            for child in children {
                self.visit_node(tree, child, stats)?;
            }
            return Ok(());
        }

        let entries = node.entries();
        stats.leaves += 1;
        stats.candidate_pairs += entries.len() * entries.len().saturating_sub(1) / 2;
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                self.test_pair(entries[i].collider, entries[j].collider)?;
            }
        }
        Ok(())
    }

    fn test_pair(&mut self, a: ColliderRef, b: ColliderRef) -> Result<()> {
        let listener = self.listener.as_ref().and_then(Weak::upgrade);
        let (ca, cb) = (self.collider(a)?, self.collider(b)?);

        if !ca.is_trigger && !cb.is_trigger {
            if self.overlap_colliders(ca, cb)? {
                self.resolve_contact(a, b)?;
                notify(listener.as_ref(), |l| l.on_collision_enter(a, b));
            } else {
                notify(listener.as_ref(), |l| l.on_collision_exit(a, b));
            }
            return Ok(());
        }

        // Trigger bookkeeping only runs while someone is listening.
        if listener.is_none() {
            return Ok(());
        }
        let pair = ColliderRefPair::new(a, b);
        let overlapping = self.overlap_colliders(ca, cb)?;
        if self.trigger_pairs.contains(&pair) {
            if !overlapping {
                notify(listener.as_ref(), |l| l.on_trigger_exit(pair.a, pair.b));
                self.trigger_pairs.remove(&pair);
            }
        } else if overlapping {
            notify(listener.as_ref(), |l| l.on_trigger_enter(pair.a, pair.b));
            self.trigger_pairs.insert(pair);
        }
        Ok(())
    }

    fn resolve_contact(&mut self, a: ColliderRef, b: ColliderRef) -> Result<()> {
        let ca = self.colliders.get(a).ok_or(PhysicsError::ColliderNotFound(a))?;
        let cb = self.colliders.get(b).ok_or(PhysicsError::ColliderNotFound(b))?;
        if ca.body == cb.body {
            // Relative motion is zero, nothing to correct.
            return Ok(());
        }
        let (ba, bb) = self
            .bodies
            .get2_mut(ca.body, cb.body)
            .ok_or(PhysicsError::BodyNotFound(ca.body))?;
        Contact::new(
            ContactBody { body: ba, collider: ca },
            ContactBody { body: bb, collider: cb },
        )
        .resolve();
        Ok(())
    }

    /// Shape overlap at the bodies' current positions.
    fn overlap_colliders(&self, ca: &Collider, cb: &Collider) -> Result<bool> {
        let pa = self.body(ca.body)?.position;
        let pb = self.body(cb.body)?.position;
        Ok(ca.shape.translated(pa).intersects(&cb.shape.translated(pb)))
    }

    /// Live bodies with their handles.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyRef, &Body)> + '_ {
        self.bodies.iter()
    }

    /// Attached colliders with their handles.
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderRef, &Collider)> + '_ {
        self.colliders.iter()
    }

    pub fn body_capacity(&self) -> usize {
        self.bodies.capacity()
    }

    pub fn collider_capacity(&self) -> usize {
        self.colliders.capacity()
    }

    /// Broadphase as built by the last `update`.
    pub fn quadtree(&self) -> &QuadTree {
        &self.quadtree
    }

    /// Trigger pairs currently considered overlapping.
    pub fn active_trigger_pairs(&self) -> impl Iterator<Item = &ColliderRefPair> + '_ {
        self.trigger_pairs.iter()
    }

    /// Return debug stats for the last completed step.
    pub fn debug_stats(&self) -> WorldStats {
        self.last_stats
    }

    /// Return timing breakdown for the last `update`.
    pub fn timing(&self) -> Option<WorldTiming> {
        self.last_timing
    }
}

fn notify(
    listener: Option<&Rc<RefCell<dyn ContactListener>>>,
    f: impl FnOnce(&mut dyn ContactListener),
) {
    let Some(listener) = listener else { return };
    match listener.try_borrow_mut() {
        Ok(mut l) => f(&mut *l),
        Err(_) => debug!("contact listener already borrowed, event dropped"),
    }
}
