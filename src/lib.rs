//! armd - Voice-command relay daemon for a robotic arm
//!
//! Relays discrete voice-derived commands from remote clients to a
//! simulated robotic arm over two chained hops: a public gateway accepting
//! long-lived JSON-line connections, and a local relay listener feeding a
//! fixed-rate simulation tick loop through a FIFO command queue.
//!
//! # Architecture
//!
//! - **IngressServer**: public-facing gateway; validates and forwards each
//!   command, one fresh relay connection per command
//! - **RelayListener**: one command per connection, fixed-literal acks
//! - **CommandQueue**: non-blocking FIFO bridge between the network side
//!   and the tick loop
//! - **ArmController**: fixed-rate tick loop, at most one command per tick
//! - **MotionDispatcher**: turns actions into joint-limited motor targets
//! - **ArmSurface**: capability seam over the actuation backend

pub mod arm;
pub mod command;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod ingress;
pub mod queue;
pub mod relay;

// High-level exports for the binaries
pub use arm::{ArmSurface, Joint, JointLimits, SimArm};
pub use command::{Action, Command, Reply};
pub use config::{ControllerConfig, GatewayConfig, MotionConfig};
pub use controller::ArmController;
pub use dispatch::{ArmPose, MotionDispatcher};
pub use error::{ArmError, Result};
pub use ingress::{GatewayContext, IngressServer};
pub use queue::{command_queue, QueueConsumer, QueueProducer};
pub use relay::{RelayListener, ACK_INVALID, ACK_RECEIVED, RELAY_READ_LIMIT};
