//! Player input, turned into commands.
//!
//! Input is sampled on the display thread, but the world belongs to the
//! scheduler thread, so every action is queued as a command instead of
//! touching the body directly.

use kinesis_core::{CommandSender, EngineResult, PhysicsEngine, SpriteIndex, Vec2};
use kinesis_physics::{BodyHandle, RigidWorld};
use tracing::trace;

use crate::config::SceneConfig;
use crate::scene::{explode, DemoSim, SpriteAsset};

/// One sampled input action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerInput {
    /// Held: push left for one step.
    Left,
    /// Held: push right for one step.
    Right,
    /// Pressed: upward impulse.
    Jump,
    /// Pressed: ring of balls around the player.
    Explode,
}

/// Queues player actions on the scheduler.
#[derive(Clone)]
pub struct PlayerController {
    commands: CommandSender<RigidWorld, SpriteAsset>,
    player: BodyHandle,
    ball_sprite: SpriteIndex,
    scene: SceneConfig,
}

impl PlayerController {
    /// Creates a controller for `player`.
    #[must_use]
    pub fn new(
        commands: CommandSender<RigidWorld, SpriteAsset>,
        player: BodyHandle,
        ball_sprite: SpriteIndex,
        scene: SceneConfig,
    ) -> Self {
        Self {
            commands,
            player,
            ball_sprite,
            scene,
        }
    }

    /// Queues the command for `input`.
    ///
    /// # Errors
    ///
    /// [`kinesis_core::EngineError::SchedulerStopped`] once the scheduler
    /// has exited.
    pub fn apply(&self, input: PlayerInput) -> EngineResult<()> {
        let player = self.player;
        trace!(?input, "player input");
        match input {
            PlayerInput::Left | PlayerInput::Right => {
                let direction = if input == PlayerInput::Left { -1.0 } else { 1.0 };
                let force = Vec2::new(direction * self.scene.player_force, 0.0);
                self.commands.enqueue(move |sim: &mut DemoSim| {
                    sim.world_mut().apply_force(player, force);
                    Ok(())
                })
            }
            PlayerInput::Jump => {
                let impulse = Vec2::new(0.0, self.scene.jump_impulse);
                self.commands.enqueue(move |sim: &mut DemoSim| {
                    sim.world_mut().apply_impulse(player, impulse);
                    Ok(())
                })
            }
            PlayerInput::Explode => {
                let scene = self.scene.clone();
                let sprite = self.ball_sprite;
                self.commands.enqueue(move |sim: &mut DemoSim| {
                    explode(sim, player, &scene, sprite).map(drop)
                })
            }
        }
    }
}
