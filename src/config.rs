//! Configuration loading for the arm daemons
//!
//! Both daemons run with sensible defaults when no configuration file is
//! provided; CLI flags in the binaries override individual fields.

use crate::{ArmError, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Configuration for the motion-controller daemon (`armd`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Address the relay listener binds to. Local-facing by default.
    #[serde(default = "default_relay_host")]
    pub bind_host: String,
    #[serde(default = "default_relay_port")]
    pub bind_port: u16,
    /// Simulation tick interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub motion: MotionConfig,
}

/// Configuration for the public-facing gateway (`arm-gateway`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub bind_host: String,
    #[serde(default = "default_gateway_port")]
    pub bind_port: u16,
    /// Address of the controller's relay listener.
    #[serde(default = "default_relay_host")]
    pub robot_host: String,
    #[serde(default = "default_relay_port")]
    pub robot_port: u16,
}

/// Movement parameters for the motion dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MotionConfig {
    /// Base joint increment per left/right command, radians.
    #[serde(default = "default_horizontal_increment")]
    pub horizontal_increment: f64,
    /// Elbow joint increment per up/down command, radians.
    #[serde(default = "default_vertical_increment")]
    pub vertical_increment: f64,
    /// Fraction of the vertical increment applied to the wrist joint.
    #[serde(default = "default_wrist_scale")]
    pub wrist_scale: f64,
    /// Maximum gripper opening distance, meters.
    #[serde(default = "default_max_aperture")]
    pub max_aperture: f64,
    /// Joint velocities set at startup, radians (or meters) per second.
    #[serde(default = "default_base_velocity")]
    pub base_velocity: f64,
    #[serde(default = "default_vertical_velocity")]
    pub vertical_velocity: f64,
    #[serde(default = "default_gripper_velocity")]
    pub gripper_velocity: f64,
}

fn default_relay_host() -> String {
    "127.0.0.1".to_string()
}

fn default_relay_port() -> u16 {
    65432
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    8765
}

fn default_tick_interval_ms() -> u64 {
    32
}

fn default_horizontal_increment() -> f64 {
    0.3
}

fn default_vertical_increment() -> f64 {
    0.2
}

fn default_wrist_scale() -> f64 {
    0.9
}

fn default_max_aperture() -> f64 {
    0.02
}

fn default_base_velocity() -> f64 {
    1.0
}

fn default_vertical_velocity() -> f64 {
    0.8
}

fn default_gripper_velocity() -> f64 {
    0.5
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            bind_host: default_relay_host(),
            bind_port: default_relay_port(),
            tick_interval_ms: default_tick_interval_ms(),
            motion: MotionConfig::default(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_host: default_gateway_host(),
            bind_port: default_gateway_port(),
            robot_host: default_relay_host(),
            robot_port: default_relay_port(),
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            horizontal_increment: default_horizontal_increment(),
            vertical_increment: default_vertical_increment(),
            wrist_scale: default_wrist_scale(),
            max_aperture: default_max_aperture(),
            base_velocity: default_base_velocity(),
            vertical_velocity: default_vertical_velocity(),
            gripper_velocity: default_gripper_velocity(),
        }
    }
}

impl ControllerConfig {
    pub fn load(config_path: &str) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| ArmError::Config(format!("Failed to read {}: {}", config_path, e)))?;

        let config: ControllerConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Socket address string for the relay listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

impl GatewayConfig {
    pub fn load(config_path: &str) -> Result<Self> {
        let contents = fs::read_to_string(config_path)
            .map_err(|e| ArmError::Config(format!("Failed to read {}: {}", config_path, e)))?;

        let config: GatewayConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    /// Socket address string of the downstream relay listener.
    pub fn robot_addr(&self) -> String {
        format!("{}:{}", self.robot_host, self.robot_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_controller_process() {
        let config = ControllerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:65432");
        assert_eq!(config.tick_interval_ms, 32);
        assert_eq!(config.motion.horizontal_increment, 0.3);
        assert_eq!(config.motion.vertical_increment, 0.2);
        assert_eq!(config.motion.wrist_scale, 0.9);
        assert_eq!(config.motion.max_aperture, 0.02);
    }

    #[test]
    fn defaults_match_the_gateway_process() {
        let config = GatewayConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8765");
        assert_eq!(config.robot_addr(), "127.0.0.1:65432");
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let yaml = "bind_port: 7000\nmotion:\n  horizontal_increment: 0.5\n";
        let config: ControllerConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.bind_port, 7000);
        assert_eq!(config.bind_host, "127.0.0.1");
        assert_eq!(config.motion.horizontal_increment, 0.5);
        assert_eq!(config.motion.wrist_scale, 0.9);
    }
}
