//! Joint actuation surface for the robotic arm
//!
//! The dispatcher never owns joint state; it reads positions and limits
//! from this surface and issues target writes. The trait keeps the motion
//! logic decoupled from the actual actuation backend (simulator, hardware
//! bridge, test double).

use std::collections::HashMap;

/// Controllable joints on the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Joint {
    /// Horizontal rotation of the whole arm.
    Base,
    Elbow,
    Wrist,
    GripperLeft,
    GripperRight,
}

impl Joint {
    pub const ALL: [Joint; 5] = [
        Joint::Base,
        Joint::Elbow,
        Joint::Wrist,
        Joint::GripperLeft,
        Joint::GripperRight,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Joint::Base => "base",
            Joint::Elbow => "elbow",
            Joint::Wrist => "wrist",
            Joint::GripperLeft => "gripper_left",
            Joint::GripperRight => "gripper_right",
        }
    }

    /// Static position limits for this joint, radians (meters for the
    /// gripper slider joints).
    pub fn limits(&self) -> JointLimits {
        match self {
            Joint::Base => JointLimits::new(-3.14, 3.14),
            Joint::Elbow | Joint::Wrist => JointLimits::new(-1.57, 1.57),
            Joint::GripperLeft | Joint::GripperRight => JointLimits::new(0.0, 0.02),
        }
    }
}

/// Position limits for a single joint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

impl JointLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, target: f64) -> f64 {
        target.clamp(self.min, self.max)
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.min && position <= self.max
    }
}

/// Capability surface over the arm's actuators.
///
/// Targets are absolute positions; the backend is responsible for the
/// actual motion toward them.
pub trait ArmSurface {
    fn set_target(&mut self, joint: Joint, position: f64);

    fn set_velocity(&mut self, joint: Joint, velocity: f64);

    /// Current measured position of the joint.
    fn position(&self, joint: Joint) -> f64;

    fn limits(&self, joint: Joint) -> JointLimits {
        joint.limits()
    }
}

/// In-memory arm simulation.
///
/// A written target becomes the readable position immediately; with the
/// tick interval well above actuation latency this is a reasonable stand-in
/// for a position-controlled simulator.
#[derive(Debug, Default)]
pub struct SimArm {
    positions: HashMap<Joint, f64>,
    velocities: HashMap<Joint, f64>,
}

impl SimArm {
    pub fn new() -> Self {
        let mut arm = Self::default();
        for joint in Joint::ALL {
            arm.positions.insert(joint, 0.0);
            arm.velocities.insert(joint, 0.0);
        }
        arm
    }

    pub fn velocity(&self, joint: Joint) -> f64 {
        self.velocities.get(&joint).copied().unwrap_or(0.0)
    }
}

impl ArmSurface for SimArm {
    fn set_target(&mut self, joint: Joint, position: f64) {
        self.positions.insert(joint, position);
    }

    fn set_velocity(&mut self, joint: Joint, velocity: f64) {
        self.velocities.insert(joint, velocity);
    }

    fn position(&self, joint: Joint) -> f64 {
        self.positions.get(&joint).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_arm_starts_at_zero() {
        let arm = SimArm::new();
        for joint in Joint::ALL {
            assert_eq!(arm.position(joint), 0.0);
        }
    }

    #[test]
    fn written_target_becomes_position() {
        let mut arm = SimArm::new();
        arm.set_target(Joint::Base, 1.25);
        assert_eq!(arm.position(Joint::Base), 1.25);
        assert_eq!(arm.position(Joint::Elbow), 0.0);
    }

    #[test]
    fn limits_clamp_out_of_range_targets() {
        let limits = Joint::Base.limits();
        assert_eq!(limits.clamp(4.0), 3.14);
        assert_eq!(limits.clamp(-4.0), -3.14);
        assert_eq!(limits.clamp(1.0), 1.0);
        assert!(limits.contains(3.14));
        assert!(!limits.contains(3.15));
    }
}
