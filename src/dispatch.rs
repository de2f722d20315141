//! Motion dispatcher
//!
//! Maps validated commands onto joint target writes. Relative moves are
//! clamped to the joint limits; named poses are written as-is since the
//! pose table is pre-validated. Unknown actions are logged and discarded.

use crate::arm::{ArmSurface, Joint};
use crate::command::{Action, Command};
use crate::config::MotionConfig;
use tracing::{debug, info, warn};

/// A named absolute target configuration.
///
/// `None` leaves the joint untouched; the gripper target is in the
/// normalized [0, 1] range (0 closed, 1 open).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmPose {
    pub base: Option<f64>,
    pub elbow: Option<f64>,
    pub wrist: Option<f64>,
    pub gripper: Option<f64>,
}

impl ArmPose {
    /// Predefined pose for a named action, if the action has one.
    pub fn named(action: &Action) -> Option<ArmPose> {
        match action {
            Action::Home => Some(ArmPose {
                base: Some(0.0),
                elbow: Some(0.0),
                wrist: Some(0.0),
                gripper: Some(0.0),
            }),
            Action::Open => Some(ArmPose {
                base: None,
                elbow: None,
                wrist: None,
                gripper: Some(1.0),
            }),
            Action::Close => Some(ArmPose {
                base: None,
                elbow: None,
                wrist: None,
                gripper: Some(0.0),
            }),
            _ => None,
        }
    }
}

/// Converts abstract actions into coordinated, joint-limited motor targets.
#[derive(Debug, Clone)]
pub struct MotionDispatcher {
    config: MotionConfig,
}

impl MotionDispatcher {
    pub fn new(config: MotionConfig) -> Self {
        Self { config }
    }

    /// Set startup velocities and zero all joint targets.
    pub fn prepare(&self, arm: &mut dyn ArmSurface) {
        arm.set_velocity(Joint::Base, self.config.base_velocity);
        arm.set_velocity(Joint::Elbow, self.config.vertical_velocity);
        arm.set_velocity(Joint::Wrist, self.config.vertical_velocity);
        arm.set_velocity(Joint::GripperLeft, self.config.gripper_velocity);
        arm.set_velocity(Joint::GripperRight, self.config.gripper_velocity);
        for joint in Joint::ALL {
            arm.set_target(joint, 0.0);
        }
    }

    /// Execute one command against the actuation surface.
    pub fn dispatch(&self, arm: &mut dyn ArmSurface, command: &Command) {
        info!("Processing action: {}", command.action);
        match &command.action {
            // Positive base rotation is left, negative is right.
            Action::Left => {
                self.move_relative(arm, Joint::Base, self.config.horizontal_increment);
            }
            Action::Right => {
                self.move_relative(arm, Joint::Base, -self.config.horizontal_increment);
            }
            Action::Up => self.move_vertical(arm, self.config.vertical_increment),
            Action::Down => self.move_vertical(arm, -self.config.vertical_increment),
            Action::Home | Action::Open | Action::Close => {
                // Named actions always have a pose entry.
                if let Some(pose) = ArmPose::named(&command.action) {
                    self.apply_pose(arm, &pose);
                }
            }
            Action::Other(name) => {
                warn!("Unknown action '{}', ignoring", name);
            }
        }
    }

    /// Move a joint by a signed increment, clamped to its limits.
    ///
    /// Returns the target actually written.
    fn move_relative(&self, arm: &mut dyn ArmSurface, joint: Joint, increment: f64) -> f64 {
        let current = arm.position(joint);
        let limits = arm.limits(joint);
        let target = current + increment;

        let target = if target < limits.min {
            warn!("{} reached minimum limit of {}", joint.name(), limits.min);
            limits.min
        } else if target > limits.max {
            warn!("{} reached maximum limit of {}", joint.name(), limits.max);
            limits.max
        } else {
            target
        };

        debug!(
            "Moving {}: current={:.2}, target={:.2}, increment={:.2}",
            joint.name(),
            current,
            target,
            increment
        );
        arm.set_target(joint, target);
        target
    }

    /// Coordinated vertical move: elbow first, then wrist with a scaled
    /// increment. The smaller wrist step smooths the compound motion; both
    /// joints are clamped independently.
    fn move_vertical(&self, arm: &mut dyn ArmSurface, increment: f64) {
        self.move_relative(arm, Joint::Elbow, increment);
        self.move_relative(arm, Joint::Wrist, increment * self.config.wrist_scale);
    }

    fn apply_pose(&self, arm: &mut dyn ArmSurface, pose: &ArmPose) {
        if let Some(target) = pose.base {
            arm.set_target(Joint::Base, target);
        }
        if let Some(target) = pose.elbow {
            arm.set_target(Joint::Elbow, target);
        }
        if let Some(target) = pose.wrist {
            arm.set_target(Joint::Wrist, target);
        }
        if let Some(opening) = pose.gripper {
            self.set_gripper(arm, opening);
        }
    }

    /// Drive both gripper actuators to the same opening.
    ///
    /// The normalized input maps linearly onto the physical range and
    /// saturates at the maximum aperture.
    fn set_gripper(&self, arm: &mut dyn ArmSurface, opening: f64) {
        arm.set_velocity(Joint::GripperLeft, self.config.gripper_velocity);
        arm.set_velocity(Joint::GripperRight, self.config.gripper_velocity);

        let target = if opening <= 0.0 {
            0.0
        } else {
            (opening * self.config.max_aperture).min(self.config.max_aperture)
        };

        debug!("Setting gripper to {:.4}", target);
        arm.set_target(Joint::GripperLeft, target);
        arm.set_target(Joint::GripperRight, target);
    }
}
