//! Simulated per-crop telemetry.
//!
//! Each attached crop gets a background task that produces a
//! [`SensorSnapshot`] every refresh interval and sends it over a channel.
//! The UI loop drains the channel; dropping the subscription stops the task.

use super::stage_resolver::normalize_crop_type;
use crate::models::SensorSnapshot;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const CHANNEL_CAPACITY: usize = 16;

/// Moisture gained per tick while irrigation is running, percentage points.
const IRRIGATION_GAIN: f64 = 3.0;

/// Evaporative loss per tick, percentage points.
const DRYING_DRIFT: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorBaseline {
    pub moisture: f64,
    pub ph: f64,
    pub npk: f64,
    pub temperature_c: f64,
    pub humidity_percent: f64,
}

impl SensorBaseline {
    pub fn for_crop_type(crop_type: &str) -> Self {
        let (moisture, ph, npk) = match normalize_crop_type(crop_type).to_lowercase().as_str() {
            "maize" => (38.0, 6.4, 210.0),
            "wheat" => (36.0, 6.8, 190.0),
            "rice" => (62.0, 6.0, 230.0),
            "tomato" => (42.0, 6.3, 250.0),
            "potato" => (40.0, 5.6, 220.0),
            _ => (40.0, 6.5, 200.0),
        };
        Self {
            moisture,
            ph,
            npk,
            temperature_c: 27.0,
            humidity_percent: 58.0,
        }
    }
}

/// Approximate N(0,1) with the Irwin-Hall sum of 12 uniforms.
fn std_normal(rng: &mut fastrand::Rng) -> f64 {
    (0..12).map(|_| rng.f64()).sum::<f64>() - 6.0
}

/// Random walk with mean reversion toward a per-crop baseline.
pub struct SensorSimulator {
    rng: fastrand::Rng,
    baseline: SensorBaseline,
    current: SensorBaseline,
    irrigating: bool,
}

impl SensorSimulator {
    pub fn new(crop_type: &str) -> Self {
        Self::from_rng(crop_type, fastrand::Rng::new())
    }

    pub fn with_seed(crop_type: &str, seed: u64) -> Self {
        Self::from_rng(crop_type, fastrand::Rng::with_seed(seed))
    }

    fn from_rng(crop_type: &str, rng: fastrand::Rng) -> Self {
        let baseline = SensorBaseline::for_crop_type(crop_type);
        Self {
            rng,
            baseline,
            current: baseline,
            irrigating: false,
        }
    }

    pub fn set_irrigating(&mut self, irrigating: bool) {
        self.irrigating = irrigating;
    }

    pub fn next_snapshot(&mut self) -> SensorSnapshot {
        let b = self.baseline;
        let c = &mut self.current;

        let mut moisture = c.moisture + 0.05 * (b.moisture - c.moisture) - DRYING_DRIFT
            + std_normal(&mut self.rng);
        if self.irrigating {
            moisture += IRRIGATION_GAIN;
        }
        c.moisture = moisture.clamp(0.0, 100.0);
        c.ph = (c.ph + 0.1 * (b.ph - c.ph) + 0.05 * std_normal(&mut self.rng)).clamp(3.5, 9.5);
        c.npk = (c.npk + 0.1 * (b.npk - c.npk) + 3.0 * std_normal(&mut self.rng)).max(0.0);
        c.temperature_c = c.temperature_c
            + 0.1 * (b.temperature_c - c.temperature_c)
            + 0.3 * std_normal(&mut self.rng);
        c.humidity_percent = (c.humidity_percent
            + 0.1 * (b.humidity_percent - c.humidity_percent)
            + std_normal(&mut self.rng))
        .clamp(0.0, 100.0);

        SensorSnapshot::new(c.moisture, c.ph, c.npk)
            .with_ambient(c.temperature_c, c.humidity_percent)
    }
}

/// Handle to a running sensor task for one crop.
///
/// The task is aborted when the subscription is dropped, so late readings
/// never reach a detached view.
pub struct SensorSubscription {
    crop_id: i64,
    rx: mpsc::Receiver<SensorSnapshot>,
    irrigating: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl SensorSubscription {
    /// Take the first reading synchronously, then spawn the periodic task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        crop_id: i64,
        mut simulator: SensorSimulator,
        interval: Duration,
    ) -> (SensorSnapshot, Self) {
        let initial = simulator.next_snapshot();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (irrigating, mut irrigating_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; the initial reading covers it
            ticker.tick().await;

            loop {
                ticker.tick().await;
                simulator.set_irrigating(*irrigating_rx.borrow_and_update());
                let snapshot = simulator.next_snapshot();
                if tx.send(snapshot).await.is_err() {
                    break;
                }
            }
        });

        tracing::debug!(crop_id, ?interval, "Sensor feed started");

        (
            initial,
            Self {
                crop_id,
                rx,
                irrigating,
                handle,
            },
        )
    }

    pub fn crop_id(&self) -> i64 {
        self.crop_id
    }

    /// All readings received since the last call, oldest first.
    pub fn drain(&mut self) -> Vec<SensorSnapshot> {
        let mut readings = Vec::new();
        while let Ok(snapshot) = self.rx.try_recv() {
            readings.push(snapshot);
        }
        readings
    }

    pub async fn next(&mut self) -> Option<SensorSnapshot> {
        self.rx.recv().await
    }

    pub fn set_irrigating(&self, irrigating: bool) {
        // Only fails if the task has exited, in which case nothing listens
        let _ = self.irrigating.send(irrigating);
    }

    pub fn unsubscribe(self) {
        tracing::debug!(crop_id = self.crop_id, "Sensor feed stopped");
    }
}

impl Drop for SensorSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_simulator_is_reproducible() {
        let mut a = SensorSimulator::with_seed("Maize", 7);
        let mut b = SensorSimulator::with_seed("Maize", 7);
        for _ in 0..20 {
            let (sa, sb) = (a.next_snapshot(), b.next_snapshot());
            assert_eq!(sa.moisture, sb.moisture);
            assert_eq!(sa.ph, sb.ph);
        }
    }

    #[test]
    fn readings_stay_in_physical_range() {
        let mut sim = SensorSimulator::with_seed("Rice", 42);
        for _ in 0..1000 {
            let s = sim.next_snapshot();
            assert!((0.0..=100.0).contains(&s.moisture));
            assert!((3.5..=9.5).contains(&s.ph));
            assert!(s.npk >= 0.0);
            assert!((0.0..=100.0).contains(&s.humidity_percent));
        }
    }

    #[test]
    fn irrigation_raises_moisture() {
        let mut dry = SensorSimulator::with_seed("Wheat", 3);
        let mut wet = SensorSimulator::with_seed("Wheat", 3);
        wet.set_irrigating(true);

        let mut last_dry = 0.0;
        let mut last_wet = 0.0;
        for _ in 0..10 {
            last_dry = dry.next_snapshot().moisture;
            last_wet = wet.next_snapshot().moisture;
        }
        assert!(last_wet > last_dry);
    }

    #[test]
    fn baseline_uses_normalized_crop_type() {
        assert_eq!(
            SensorBaseline::for_crop_type("Wild Onion"),
            SensorBaseline::for_crop_type("Maize")
        );
    }

    #[tokio::test]
    async fn subscription_emits_periodic_readings() {
        let sim = SensorSimulator::with_seed("Tomato", 1);
        let (initial, mut sub) = SensorSubscription::spawn(5, sim, Duration::from_millis(10));
        assert!(initial.moisture > 0.0);
        assert_eq!(sub.crop_id(), 5);

        let next = tokio::time::timeout(Duration::from_secs(2), sub.next())
            .await
            .expect("reading within timeout");
        assert!(next.is_some());
    }

    #[tokio::test]
    async fn dropping_subscription_stops_task() {
        let sim = SensorSimulator::with_seed("Tomato", 1);
        let (_, sub) = SensorSubscription::spawn(5, sim, Duration::from_millis(5));
        let handle_finished = {
            let abort = sub.handle.abort_handle();
            drop(sub);
            tokio::time::sleep(Duration::from_millis(20)).await;
            abort.is_finished()
        };
        assert!(handle_finished);
    }
}
