//! # Player
//!
//! A walking body that falls, swims and collides with the voxel world. Its feet position
//! is the single point that drives chunk streaming and eviction.
//!
//! Collision is resolved per axis after integrating the velocity: the vertical axis
//! against the block under the feet, the horizontal axes against the block one
//! half-width ahead of the body. Air and water never collide.

use cgmath::{InnerSpace, Point3, Vector3};

use super::voxels::block::block_type::BlockType;
use super::voxels::world::{block_of_point, ChunkSource};

/// Downward acceleration in air, blocks per second squared.
pub const GRAVITY: f32 = 15.81;
/// Downward acceleration while the feet are in water.
pub const WATER_GRAVITY: f32 = 1.5;
/// Vertical speed of a jump.
pub const JUMP_VELOCITY: f32 = 6.0;
/// Walking speed, blocks per second.
pub const WALK_SPEED: f32 = 4.0;
/// Half the width of the body on the horizontal axes.
pub const HALF_WIDTH: f32 = 0.25;
/// Eye height above the feet.
pub const EYE_HEIGHT: f32 = 1.5;
/// Longest time step integrated at once, in seconds.
pub const MAX_STEP: f32 = 0.1;

/// Gap left between the body and a block it collided with.
const SKIN: f32 = 0.001;

/// The movement requested for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Walk along the view direction
    pub forward: bool,
    /// Walk against the view direction
    pub backward: bool,
    /// Strafe left
    pub left: bool,
    /// Strafe right
    pub right: bool,
    /// Jump from the ground, or swim up in water
    pub jump: bool,
    /// Remove the block in front of the eyes
    pub dig: bool,
    /// Horizontal view angle in radians; zero looks down negative z
    pub yaw: f32,
    /// Vertical view angle in radians; positive looks up
    pub pitch: f32,
}

/// The player's body.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Feet position in world space
    pub position: Point3<f32>,
    /// Current velocity in blocks per second
    pub velocity: Vector3<f32>,
    /// Horizontal view angle from the last input
    pub yaw: f32,
    /// Vertical view angle from the last input
    pub pitch: f32,
    on_ground: bool,
}

impl Player {
    /// Creates a player standing still at `position`.
    pub fn new(position: Point3<f32>) -> Self {
        Player {
            position,
            velocity: Vector3::new(0.0, 0.0, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            on_ground: false,
        }
    }

    /// Whether the last step ended standing on a block.
    pub fn on_ground(&self) -> bool {
        self.on_ground
    }

    /// Position of the eyes.
    pub fn eye_position(&self) -> Point3<f32> {
        self.position + Vector3::unit_y() * EYE_HEIGHT
    }

    /// Unit vector the eyes look along.
    pub fn view_direction(&self) -> Vector3<f32> {
        let (yaw_sin, yaw_cos) = self.yaw.sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.sin_cos();
        Vector3::new(-yaw_sin * pitch_cos, pitch_sin, -yaw_cos * pitch_cos)
    }

    /// Advances the body by one time step.
    ///
    /// # Arguments
    /// * `dt` - Elapsed time in seconds; clamped to [`MAX_STEP`]
    /// * `input` - Requested movement and view angles
    /// * `world` - Blocks to collide with; unloaded space is empty
    pub fn step(&mut self, dt: f32, input: &PlayerInput, world: &dyn ChunkSource) {
        let dt = dt.clamp(0.0, MAX_STEP);
        self.yaw = input.yaw;
        self.pitch = input.pitch;

        let forward = Vector3::new(-self.yaw.sin(), 0.0, -self.yaw.cos());
        let right = Vector3::new(self.yaw.cos(), 0.0, -self.yaw.sin());
        let mut walk = Vector3::new(0.0, 0.0, 0.0);
        if input.forward {
            walk += forward;
        }
        if input.backward {
            walk -= forward;
        }
        if input.right {
            walk += right;
        }
        if input.left {
            walk -= right;
        }
        if walk.magnitude2() > 0.0 {
            walk = walk.normalize_to(WALK_SPEED);
        }
        self.velocity.x = walk.x;
        self.velocity.z = walk.z;

        let feet = world.block_at(block_of_point(self.position));
        if input.jump && (self.on_ground || feet.is_water()) {
            self.velocity.y = JUMP_VELOCITY;
        }
        match feet {
            BlockType::AIR => self.velocity.y -= GRAVITY * dt,
            BlockType::WATER => self.velocity.y -= WATER_GRAVITY * dt,
            _ => {}
        }

        self.position += self.velocity * dt;
        self.on_ground = false;

        if self.velocity.y < 0.0 {
            let below = block_of_point(self.position);
            if world.block_at(below).is_collidable() {
                self.velocity.y = 0.0;
                self.position.y = below.y as f32 + 1.0 + SKIN;
                self.on_ground = true;
            }
        }

        if self.velocity.x != 0.0 {
            let ahead = HALF_WIDTH.copysign(self.velocity.x);
            let hit = block_of_point(self.position + Vector3::new(ahead, 0.0, 0.0));
            if world.block_at(hit).is_collidable() {
                self.position.x = if self.velocity.x > 0.0 {
                    hit.x as f32 - HALF_WIDTH - SKIN
                } else {
                    hit.x as f32 + 1.0 + HALF_WIDTH + SKIN
                };
                self.velocity.x = 0.0;
            }
        }

        if self.velocity.z != 0.0 {
            let ahead = HALF_WIDTH.copysign(self.velocity.z);
            let hit = block_of_point(self.position + Vector3::new(0.0, 0.0, ahead));
            if world.block_at(hit).is_collidable() {
                self.position.z = if self.velocity.z > 0.0 {
                    hit.z as f32 - HALF_WIDTH - SKIN
                } else {
                    hit.z as f32 + 1.0 + HALF_WIDTH + SKIN
                };
                self.velocity.z = 0.0;
            }
        }
    }
}
