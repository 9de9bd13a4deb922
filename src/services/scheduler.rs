//! Plane scheduling across two threads.
//!
//! With threading enabled the luma plane runs on the calling thread while a
//! persistent worker processes Cb and Cr. Work and results travel through
//! bounded channels; a frame is complete only once both sides are done.

use std::sync::Arc;
use std::thread::JoinHandle;

use f3kdb_core::{Core, DebandError, Plane};

use crate::error::HostError;
use crate::models::{Frame, PlaneBuffer};

struct ChromaJob {
    frame_index: usize,
    src: Arc<Frame>,
    planes: [PlaneBuffer; 2],
}

struct ChromaDone {
    planes: [PlaneBuffer; 2],
    result: Result<(), DebandError>,
}

struct ChromaWorker {
    jobs: Option<flume::Sender<ChromaJob>>,
    done: flume::Receiver<ChromaDone>,
    handle: Option<JoinHandle<()>>,
}

impl ChromaWorker {
    fn spawn(core: Arc<Core>) -> Result<Self, HostError> {
        let (jobs_tx, jobs_rx) = flume::bounded::<ChromaJob>(1);
        let (done_tx, done_rx) = flume::bounded(1);

        let handle = std::thread::Builder::new()
            .name("f3kdb-chroma".to_string())
            .spawn(move || {
                while let Ok(job) = jobs_rx.recv() {
                    let ChromaJob {
                        frame_index,
                        src,
                        mut planes,
                    } = job;
                    let result = [Plane::Cb, Plane::Cr]
                        .into_iter()
                        .zip(planes.iter_mut())
                        .try_for_each(|(plane, dst)| {
                            process_plane(&core, frame_index, plane, &src, dst)
                        });
                    if done_tx.send(ChromaDone { planes, result }).is_err() {
                        break;
                    }
                }
                tracing::trace!("Chroma worker exiting");
            })?;

        Ok(Self {
            jobs: Some(jobs_tx),
            done: done_rx,
            handle: Some(handle),
        })
    }
}

impl Drop for ChromaWorker {
    fn drop(&mut self) {
        // closing the job channel ends the worker loop
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Chroma worker panicked");
            }
        }
    }
}

/// Runs the three planes of a frame through a [`Core`].
pub struct PlaneScheduler {
    core: Arc<Core>,
    worker: Option<ChromaWorker>,
}

impl PlaneScheduler {
    pub fn new(core: Arc<Core>, threaded: bool) -> Result<Self, HostError> {
        let worker = if threaded {
            Some(ChromaWorker::spawn(Arc::clone(&core))?)
        } else {
            None
        };
        Ok(Self { core, worker })
    }

    pub fn is_threaded(&self) -> bool {
        self.worker.is_some()
    }

    /// Deband `src` into `dst`. `dst` must be laid out for the core's
    /// output format.
    pub fn process_frame(
        &self,
        frame_index: usize,
        src: &Arc<Frame>,
        dst: &mut Frame,
    ) -> Result<(), HostError> {
        let Some(worker) = &self.worker else {
            for plane in Plane::ALL {
                process_plane(&self.core, frame_index, plane, src, dst.plane_mut(plane))?;
            }
            return Ok(());
        };

        let jobs = worker.jobs.as_ref().ok_or(HostError::WorkerStopped)?;
        let job = ChromaJob {
            frame_index,
            src: Arc::clone(src),
            planes: dst.take_chroma(),
        };
        if let Err(flume::SendError(job)) = jobs.send(job) {
            dst.restore_chroma(job.planes);
            return Err(HostError::WorkerStopped);
        }

        let luma = process_plane(&self.core, frame_index, Plane::Y, src, dst.plane_mut(Plane::Y));

        // the chroma planes must come back before returning, even on error
        let done = worker.done.recv().map_err(|_| HostError::WorkerStopped)?;
        dst.restore_chroma(done.planes);

        luma?;
        done.result?;
        Ok(())
    }
}

fn process_plane(
    core: &Core,
    frame_index: usize,
    plane: Plane,
    src: &Frame,
    dst: &mut PlaneBuffer,
) -> Result<(), DebandError> {
    let src = src.plane(plane);
    let dst_pitch = dst.pitch();
    core.process_plane(
        frame_index,
        plane,
        dst.data_mut(),
        dst_pitch,
        src.data(),
        src.pitch(),
    )
}
