//! # Rigid World
//!
//! [`PhysicsEngine`] over a rapier2d pipeline. Each KINESIS body is one
//! rapier rigid body; each attached shape is one collider parented to it.
//!
//! ```text
//! apply_force   -> add_force (cleared after the next step)
//! apply_impulse -> apply_impulse (immediate)
//! step          -> IntegrationParameters { dt, solver iterations } -> PhysicsPipeline::step
//! ```

use std::num::NonZeroUsize;

use kinesis_core::{BodyDef, BodyKind, PhysicsEngine, Shape, Vec2};
use rapier2d::prelude::{
    CCDSolver, ColliderBuilder, ColliderSet, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, LockedAxes, MultibodyJointSet, NarrowPhase,
    PhysicsPipeline, QueryPipeline, Real, RigidBody, RigidBodyBuilder, RigidBodyHandle,
    RigidBodySet, RigidBodyType, Vector,
};
use tracing::{debug, trace};

use crate::config::WorldConfig;
use crate::conversions::{from_rapier_point, from_rapier_vec, to_rapier_point, to_rapier_vec};

/// Handle to a body in a [`RigidWorld`].
pub type BodyHandle = RigidBodyHandle;

/// Built-in [`PhysicsEngine`].
///
/// Bodies are never removed, so every handle returned by `create_body`
/// stays valid for the lifetime of the world. Queries on an unknown
/// handle return zero values and mutations on it are ignored.
pub struct RigidWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    // Bodies with a user force pending; rapier keeps forces until reset.
    forced: Vec<BodyHandle>,
}

impl RigidWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(config: &WorldConfig) -> Self {
        Self {
            gravity: to_rapier_vec(config.gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            forced: Vec::new(),
        }
    }

    /// Gravity applied to dynamic bodies.
    #[must_use]
    pub fn gravity(&self) -> Vec2 {
        from_rapier_vec(&self.gravity)
    }

    /// Changes gravity for subsequent steps.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = to_rapier_vec(gravity);
    }

    /// Number of bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Body state, for inspection.
    #[must_use]
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// World-space bounds `(min, max)` of every collider on `handle`.
    ///
    /// `None` for an unknown handle or a body without shapes.
    #[must_use]
    pub fn bounds(&self, handle: BodyHandle) -> Option<(Vec2, Vec2)> {
        self.bodies
            .get(handle)?
            .colliders()
            .iter()
            .filter_map(|collider| self.colliders.get(*collider))
            .map(|collider| {
                let aabb = collider.compute_aabb();
                (from_rapier_point(&aabb.mins), from_rapier_point(&aabb.maxs))
            })
            .reduce(|(min_a, max_a), (min_b, max_b)| {
                (
                    Vec2::new(min_a.x.min(min_b.x), min_a.y.min(min_b.y)),
                    Vec2::new(max_a.x.max(max_b.x), max_a.y.max(max_b.y)),
                )
            })
    }

    /// Collider pairs touching after the last step.
    #[must_use]
    pub fn contact_count(&self) -> usize {
        self.narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .count()
    }
}

impl Default for RigidWorld {
    fn default() -> Self {
        Self::new(&WorldConfig::default())
    }
}

impl PhysicsEngine for RigidWorld {
    type Handle = BodyHandle;

    fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let body_type = match def.kind {
            BodyKind::Static => RigidBodyType::Fixed,
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Kinematic => RigidBodyType::KinematicVelocityBased,
        };
        let locked_axes = if def.fixed_rotation {
            LockedAxes::ROTATION_LOCKED
        } else {
            LockedAxes::empty()
        };
        let mut builder = RigidBodyBuilder::new(body_type)
            .translation(to_rapier_vec(def.position))
            .rotation(def.angle)
            .locked_axes(locked_axes);
        if def.kind != BodyKind::Static {
            builder = builder.linvel(to_rapier_vec(def.linear_velocity));
        }

        let handle = self.bodies.insert(builder.build());
        debug!(?handle, kind = ?def.kind, x = def.position.x, y = def.position.y, "body created");
        handle
    }

    fn attach_shape(&mut self, body: BodyHandle, shape: Shape, density: f32, friction: f32) {
        let builder = match shape {
            Shape::Box {
                half_width,
                half_height,
            } => ColliderBuilder::cuboid(half_width, half_height),
            Shape::Circle { radius } => ColliderBuilder::ball(radius),
            Shape::Edge { a, b } => ColliderBuilder::segment(to_rapier_point(a), to_rapier_point(b)),
        };
        let collider = builder.density(density).friction(friction).build();
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        // Mass is otherwise refreshed at the next step; impulses need it now.
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
    }

    fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        if dt <= 0.0 {
            return;
        }

        let params = &mut self.integration_parameters;
        params.dt = dt;
        params.num_solver_iterations = usize::try_from(velocity_iterations)
            .ok()
            .and_then(NonZeroUsize::new)
            .unwrap_or(NonZeroUsize::MIN);
        params.num_internal_stabilization_iterations =
            usize::try_from(position_iterations).unwrap_or(usize::MAX);

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for handle in self.forced.drain(..) {
            if let Some(rb) = self.bodies.get_mut(handle) {
                rb.reset_forces(false);
            }
        }

        trace!(
            bodies = self.bodies.len(),
            contacts = self.contact_count(),
            "world stepped"
        );
    }

    fn position(&self, body: BodyHandle) -> Vec2 {
        self.bodies
            .get(body)
            .map_or(Vec2::ZERO, |rb| from_rapier_vec(rb.translation()))
    }

    fn angle(&self, body: BodyHandle) -> f32 {
        self.bodies.get(body).map_or(0.0, |rb| rb.rotation().angle())
    }

    fn linear_velocity(&self, body: BodyHandle) -> Vec2 {
        self.bodies
            .get(body)
            .map_or(Vec2::ZERO, |rb| from_rapier_vec(rb.linvel()))
    }

    fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            if rb.is_dynamic() {
                rb.add_force(to_rapier_vec(force), true);
                self.forced.push(body);
            }
        }
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            if rb.is_dynamic() {
                rb.apply_impulse(to_rapier_vec(impulse), true);
            }
        }
    }

    fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            if !rb.is_fixed() {
                rb.set_linvel(to_rapier_vec(velocity), true);
            }
        }
    }
}
