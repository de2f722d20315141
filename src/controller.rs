//! Arm controller tick loop
//!
//! Drives the motion dispatcher at a fixed rate. Each tick drains at most
//! one queued command; an empty queue is the normal idle case. The loop
//! runs on a single task, one tick at a time.

use crate::arm::ArmSurface;
use crate::config::ControllerConfig;
use crate::dispatch::MotionDispatcher;
use crate::queue::QueueConsumer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub struct ArmController<A: ArmSurface> {
    arm: A,
    dispatcher: MotionDispatcher,
    queue: QueueConsumer,
    tick_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl<A: ArmSurface> ArmController<A> {
    pub fn new(
        arm: A,
        config: &ControllerConfig,
        queue: QueueConsumer,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            arm,
            dispatcher: MotionDispatcher::new(config.motion.clone()),
            queue,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            shutdown,
        }
    }

    /// Run ticks until the shutdown flag is set. In-flight ticks always
    /// complete; shutdown is cooperative.
    pub async fn run(&mut self) {
        info!("Robot controller started");
        self.dispatcher.prepare(&mut self.arm);

        let mut interval = tokio::time::interval(self.tick_interval);
        while !self.shutdown.load(Ordering::Relaxed) {
            interval.tick().await;
            self.step();
        }

        info!("Robot controller stopped");
    }

    /// One simulation tick: dispatch at most one dequeued command.
    pub fn step(&mut self) {
        if let Some(command) = self.queue.pop() {
            info!("Received command: {:?}", command);
            self.dispatcher.dispatch(&mut self.arm, &command);
        } else {
            debug!("Tick: no pending command");
        }
    }

    pub fn arm(&self) -> &A {
        &self.arm
    }
}
