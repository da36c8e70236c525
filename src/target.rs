//! Target fields and their regeneration.
//!
//! A [`TargetField`] is an immutable, shared list of one target position per
//! particle. It is never edited: regeneration produces a whole new field and
//! the owner swaps its handle, so a tick can only ever see a complete field.
//!
//! Sampling a 2048-wide raster is too slow to do inside a frame, so
//! [`FieldRegenerator`] hands requests to a background worker and the render
//! loop picks finished fields up with a non-blocking [`poll`]. Only the
//! newest request matters; results for superseded requests are dropped.
//!
//! [`poll`]: FieldRegenerator::poll

use crate::sampler::GlyphFieldSampler;
use glam::Vec3;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// One target position per particle, shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetField {
    points: Arc<[Vec3]>,
}

impl TargetField {
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points: points.into() }
    }

    /// A field with every target at the origin.
    pub fn origin(count: usize) -> Self {
        Self::new(vec![Vec3::ZERO; count])
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether two handles share the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}

/// Everything a field is sampled from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRequest {
    pub text: String,
    pub count: usize,
    pub aspect_ratio: f32,
    pub compact: bool,
}

impl FieldRequest {
    fn sample(&self, sampler: &GlyphFieldSampler) -> TargetField {
        TargetField::new(sampler.sample(&self.text, self.count, self.aspect_ratio, self.compact))
    }
}

struct Worker {
    requests: Sender<FieldRequest>,
    results: Receiver<(FieldRequest, TargetField)>,
}

impl Worker {
    fn spawn(sampler: GlyphFieldSampler) -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<FieldRequest>();
        let (result_tx, result_rx) = mpsc::channel();

        thread::Builder::new()
            .name("field-sampler".into())
            .spawn(move || {
                while let Ok(mut request) = request_rx.recv() {
                    // Skip straight to the newest request.
                    while let Ok(newer) = request_rx.try_recv() {
                        request = newer;
                    }
                    let field = request.sample(&sampler);
                    if result_tx.send((request, field)).is_err() {
                        return;
                    }
                }
            })?;

        Ok(Self {
            requests: request_tx,
            results: result_rx,
        })
    }
}

/// Produces target fields off the render path.
pub struct FieldRegenerator {
    sampler: GlyphFieldSampler,
    worker: Option<Worker>,
    latest: Option<FieldRequest>,
    ready: Option<TargetField>,
}

impl FieldRegenerator {
    /// Regenerate on a background worker thread.
    ///
    /// Falls back to inline sampling if the thread cannot be started.
    pub fn spawn(sampler: GlyphFieldSampler) -> Self {
        let worker = match Worker::spawn(sampler.clone()) {
            Ok(worker) => Some(worker),
            Err(e) => {
                warn!(error = %e, "field worker unavailable, sampling inline");
                None
            }
        };
        Self {
            sampler,
            worker,
            latest: None,
            ready: None,
        }
    }

    /// Regenerate synchronously inside [`request`](Self::request).
    pub fn inline(sampler: GlyphFieldSampler) -> Self {
        Self {
            sampler,
            worker: None,
            latest: None,
            ready: None,
        }
    }

    pub fn is_threaded(&self) -> bool {
        self.worker.is_some()
    }

    /// The most recent request, whether or not its field is ready.
    pub fn latest(&self) -> Option<&FieldRequest> {
        self.latest.as_ref()
    }

    /// Ask for a new field. Supersedes any request still in flight.
    ///
    /// Identical consecutive requests are ignored.
    pub fn request(&mut self, request: FieldRequest) {
        if self.latest.as_ref() == Some(&request) {
            return;
        }
        debug!(text = %request.text, count = request.count, aspect = request.aspect_ratio, compact = request.compact, "field requested");
        self.latest = Some(request.clone());

        if let Some(worker) = &self.worker {
            if worker.requests.send(request.clone()).is_ok() {
                return;
            }
            warn!("field worker exited, sampling inline");
            self.worker = None;
        }
        self.ready = Some(request.sample(&self.sampler));
    }

    /// Take the newest finished field, if one arrived since the last poll.
    ///
    /// Never blocks.
    pub fn poll(&mut self) -> Option<TargetField> {
        let mut disconnected = false;
        if let Some(worker) = &self.worker {
            loop {
                match worker.results.try_recv() {
                    Ok((request, field)) => {
                        if self.latest.as_ref() == Some(&request) {
                            self.ready = Some(field);
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }

        if disconnected {
            warn!("field worker disconnected, sampling inline");
            self.worker = None;
            if let Some(request) = &self.latest {
                self.ready = Some(request.sample(&self.sampler));
            }
        }
        self.ready.take()
    }

    /// Wait up to `timeout` for the field of the latest request.
    ///
    /// For startup and tests; the render loop uses [`poll`](Self::poll).
    pub fn wait(&mut self, timeout: Duration) -> Option<TargetField> {
        if let Some(field) = self.poll() {
            return Some(field);
        }
        let deadline = Instant::now() + timeout;
        let worker = self.worker.as_ref()?;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match worker.results.recv_timeout(remaining) {
                Ok((request, field)) => {
                    if self.latest.as_ref() == Some(&request) {
                        return Some(field);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str, count: usize) -> FieldRequest {
        FieldRequest {
            text: text.to_string(),
            count,
            aspect_ratio: 2.0,
            compact: false,
        }
    }

    #[test]
    fn test_field_clone_shares_points() {
        let field = TargetField::new(vec![Vec3::ONE; 4]);
        let other = field.clone();
        assert!(field.ptr_eq(&other));
        assert_eq!(other.len(), 4);

        let rebuilt = TargetField::new(vec![Vec3::ONE; 4]);
        assert_eq!(field, rebuilt);
        assert!(!field.ptr_eq(&rebuilt));
    }

    #[test]
    fn test_inline_regeneration_is_ready_immediately() {
        let mut regen = FieldRegenerator::inline(GlyphFieldSampler::builtin());
        assert!(regen.poll().is_none());

        regen.request(request("HI", 300));
        let field = regen.poll().unwrap();
        assert_eq!(field.len(), 300);
        assert!(regen.poll().is_none());
    }

    #[test]
    fn test_duplicate_request_is_ignored() {
        let mut regen = FieldRegenerator::inline(GlyphFieldSampler::builtin());
        regen.request(request("HI", 10));
        assert!(regen.poll().is_some());
        regen.request(request("HI", 10));
        assert!(regen.poll().is_none());
    }

    #[test]
    fn test_threaded_regeneration_delivers_latest() {
        let mut regen = FieldRegenerator::spawn(GlyphFieldSampler::builtin());
        regen.request(request("A", 50));
        regen.request(request("南航", 50));

        let field = regen.wait(Duration::from_secs(30)).unwrap();
        assert_eq!(field.len(), 50);
        // The later request lights nothing with the bitmap face.
        assert!(field.points().iter().all(|p| *p == Vec3::ZERO));
        assert_eq!(regen.latest().map(|r| r.text.as_str()), Some("南航"));
    }
}
