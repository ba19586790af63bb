// absloc_core/src/raw.rs

//! The driver-facing side of an absolute sensor: raw samples and the
//! contract a hardware (or replayed) source has to fulfil.

use std::collections::VecDeque;

use crate::error::FusionError;
use crate::types::RawId;

/// One timestamped reading as produced by the driver. Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSample {
    pub id: RawId,
    pub timestamp: f64,
    /// Channel values in the driver's native order.
    pub values: Vec<f64>,
    /// Per-channel uncertainty, parallel to `values`. Drivers report the
    /// standard deviation here; it is squared when a covariance is formed.
    pub variances: Option<Vec<f64>>,
}

impl RawSample {
    pub fn new(id: RawId, timestamp: f64, values: Vec<f64>) -> Self {
        Self {
            id,
            timestamp,
            values,
            variances: None,
        }
    }

    pub fn with_variances(mut self, variances: Vec<f64>) -> Self {
        self.variances = Some(variances);
        self
    }

    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// Channel counts announced by a driver when it is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLayout {
    pub data_size: usize,
    pub variance_size: usize,
}

impl RawLayout {
    /// Variances are only usable when there is exactly one per data channel.
    pub fn has_variance(&self) -> bool {
        self.variance_size == self.data_size
    }
}

/// Entry of the window of readings a driver still holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawInfo {
    pub id: RawId,
    pub timestamp: f64,
}

/// The contract for anything that yields raw absolute readings.
pub trait RawSource: Send {
    /// Announces the channel layout. Called once when a sensor is built.
    fn configure(&mut self) -> RawLayout;

    /// Reads a sample without consuming it.
    fn observe(&self, id: RawId) -> Result<RawSample, FusionError>;

    /// Reads a sample and releases the driver resource behind it.
    fn fetch(&mut self, id: RawId) -> Result<RawSample, FusionError>;

    /// Releases the driver resource behind `id` without using its data.
    fn release(&mut self, id: RawId) -> Result<(), FusionError> {
        self.fetch(id).map(|_| ())
    }

    /// The bounded, ordered window of readings currently held by the driver.
    fn available(&self) -> Vec<RawInfo>;
}

/// An in-memory driver buffer holding at most `capacity` readings.
///
/// Fetching or releasing a reading drops it together with every older one,
/// the way a streaming driver advances its read cursor.
#[derive(Debug, Clone)]
pub struct BufferedRawSource {
    layout: RawLayout,
    capacity: usize,
    samples: VecDeque<RawSample>,
    next_id: u64,
}

impl BufferedRawSource {
    pub fn new(layout: RawLayout, capacity: usize) -> Self {
        Self {
            layout,
            capacity: capacity.max(1),
            samples: VecDeque::new(),
            next_id: 0,
        }
    }

    /// Appends a reading, assigning it the next id. Evicts the oldest reading
    /// when the buffer is full.
    pub fn push(&mut self, timestamp: f64, values: Vec<f64>, variances: Option<Vec<f64>>) -> RawId {
        let id = RawId(self.next_id);
        self.next_id += 1;
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(RawSample {
            id,
            timestamp,
            values,
            variances,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn position(&self, id: RawId) -> Result<usize, FusionError> {
        self.samples
            .iter()
            .position(|s| s.id == id)
            .ok_or(FusionError::UnknownRawId(id))
    }
}

impl RawSource for BufferedRawSource {
    fn configure(&mut self) -> RawLayout {
        self.layout
    }

    fn observe(&self, id: RawId) -> Result<RawSample, FusionError> {
        let pos = self.position(id)?;
        Ok(self.samples[pos].clone())
    }

    fn fetch(&mut self, id: RawId) -> Result<RawSample, FusionError> {
        let pos = self.position(id)?;
        let sample = self.samples[pos].clone();
        self.samples.drain(..=pos);
        Ok(sample)
    }

    fn available(&self) -> Vec<RawInfo> {
        self.samples
            .iter()
            .map(|s| RawInfo {
                id: s.id,
                timestamp: s.timestamp,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> BufferedRawSource {
        BufferedRawSource::new(
            RawLayout {
                data_size: 3,
                variance_size: 3,
            },
            3,
        )
    }

    #[test]
    fn observe_does_not_consume() {
        let mut src = source();
        let id = src.push(0.0, vec![1.0, 2.0, 3.0], Some(vec![0.1; 3]));
        assert_eq!(src.observe(id).unwrap().values, vec![1.0, 2.0, 3.0]);
        assert_eq!(src.len(), 1);
    }

    #[test]
    fn fetch_consumes_up_to_id() {
        let mut src = source();
        let a = src.push(0.0, vec![0.0; 3], None);
        let b = src.push(0.1, vec![1.0; 3], None);
        let c = src.push(0.2, vec![2.0; 3], None);
        assert_eq!(src.fetch(b).unwrap().id, b);
        assert_eq!(src.observe(a), Err(FusionError::UnknownRawId(a)));
        assert_eq!(src.available().iter().map(|i| i.id).collect::<Vec<_>>(), vec![c]);
    }

    #[test]
    fn release_frees_the_reading() {
        let mut src = source();
        let a = src.push(0.0, vec![0.0; 3], None);
        src.release(a).unwrap();
        assert!(src.is_empty());
        assert_eq!(src.release(a), Err(FusionError::UnknownRawId(a)));
    }

    #[test]
    fn window_is_bounded() {
        let mut src = source();
        for i in 0..5 {
            src.push(i as f64, vec![i as f64; 3], None);
        }
        let ids: Vec<u64> = src.available().iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn variance_requires_matching_channel_count() {
        let layout = RawLayout {
            data_size: 3,
            variance_size: 0,
        };
        assert!(!layout.has_variance());
    }
}
