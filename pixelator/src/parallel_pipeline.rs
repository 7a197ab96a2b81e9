// THEORY:
// The `parallel_pipeline` runs the same pass as `pipeline::render`, but spreads
// the per-block interpolation over a pool of tokio workers. Interpolators are
// pure and the pixel source is only read, so blocks can be colored in any order
// on any worker with no locking. Only the final grouping step has to see the
// blocks in scan order, because the histogram's tie-breaks depend on it.
//
// Flow of one pass:
// 1.  Take a ticket (a generation number). Every new pass supersedes all older ones.
// 2.  Partition the image and cut the block list into contiguous batches.
// 3.  The dispatcher hands batches to workers round-robin; each batch comes back
//     through its own oneshot channel.
// 4.  Results are joined in batch order and grouped exactly like the
//     synchronous engine does it.
// 5.  If a newer ticket was issued while the pass was running, the result is
//     reported as superseded. Mixing the result of an old grid size into the
//     display would be meaningless, so the caller must discard it.

use crate::core_modules::chunk::chunk::Block;
use crate::core_modules::color_usage::ColorUsage;
use crate::core_modules::grid_manager;
use crate::core_modules::interpolator::Interpolator;
use crate::core_modules::pixel::pixel::Color;
use crate::core_modules::pixel_buffer::PixelSource;
use crate::error::{PixelateError, Result};
use crate::pipeline::{self, Pixelation, PixelationConfig};
use futures::future::join_all;
use log::{debug, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot};

/// Batches handed out per worker and pass.
const BATCHES_PER_WORKER: usize = 4;

/// A pixel source that can be shared with worker tasks.
pub type SharedSource = Arc<dyn PixelSource + Send + Sync>;

struct BlockTask {
    source: SharedSource,
    interpolator: Interpolator,
    blocks: Vec<Block>,
    result_sender: oneshot::Sender<Result<Vec<Color>>>,
}

/// Round-robin pool of tasks that color batches of blocks.
pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<BlockTask>,
    worker_count: usize,
}

impl WorkerPool {
    /// Spawns `worker_count` workers and their dispatcher on the current tokio runtime.
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<BlockTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<BlockTask>())
            .unzip();

        // Dispatcher
        tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                if let Err(mpsc::error::SendError(task)) = worker_senders[worker_idx].send(task) {
                    let _ = task
                        .result_sender
                        .send(Err(PixelateError::WorkerUnavailable("worker stopped")));
                }
                worker_idx = (worker_idx + 1) % worker_senders.len();
            }
        });

        for mut worker_receiver in worker_receivers {
            tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    let colors = Self::color_blocks(&task);
                    let _ = task.result_sender.send(colors);
                }
            });
        }

        Self {
            task_sender,
            worker_count,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn color_blocks(task: &BlockTask) -> Result<Vec<Color>> {
        task.blocks
            .iter()
            .map(|block| {
                task.interpolator
                    .determine_color(task.source.as_ref(), block.area())
            })
            .collect()
    }

    /// Colors `blocks` on some worker; the result keeps the input order.
    pub async fn color(
        &self,
        source: SharedSource,
        interpolator: Interpolator,
        blocks: Vec<Block>,
    ) -> Result<Vec<Color>> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = BlockTask {
            source,
            interpolator,
            blocks,
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| PixelateError::WorkerUnavailable("failed to send task to worker pool"))?;

        result_receiver
            .await
            .map_err(|_| PixelateError::WorkerUnavailable("failed to receive result from worker"))?
    }
}

/// Identifies one requested pass. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PassTicket(u64);

/// What became of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// The pass is the most recently requested one.
    Current(Pixelation),
    /// A newer pass was requested while this one ran; discard it.
    Superseded { ticket: PassTicket, latest: PassTicket },
}

impl PassOutcome {
    pub fn into_current(self) -> Option<Pixelation> {
        match self {
            PassOutcome::Current(pixelation) => Some(pixelation),
            PassOutcome::Superseded { .. } => None,
        }
    }
}

/// Pixelation engine backed by a `WorkerPool`.
pub struct ParallelPixelator {
    worker_pool: WorkerPool,
    generation: AtomicU64,
}

impl Default for ParallelPixelator {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelPixelator {
    /// One worker per CPU. Must be called from within a tokio runtime.
    pub fn new() -> Self {
        Self::with_workers(num_cpus::get())
    }

    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_pool: WorkerPool::new(worker_count),
            generation: AtomicU64::new(0),
        }
    }

    /// Registers a new pass, superseding every pass registered before it.
    pub fn begin_pass(&self) -> PassTicket {
        PassTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn latest(&self) -> PassTicket {
        PassTicket(self.generation.load(Ordering::SeqCst))
    }

    /// `begin_pass` followed by `run_pass`.
    pub async fn render(
        &self,
        source: Option<SharedSource>,
        config: &PixelationConfig,
    ) -> Result<PassOutcome> {
        let ticket = self.begin_pass();
        self.run_pass(ticket, source, config).await
    }

    /// Runs the pass registered as `ticket`.
    pub async fn run_pass(
        &self,
        ticket: PassTicket,
        source: Option<SharedSource>,
        config: &PixelationConfig,
    ) -> Result<PassOutcome> {
        let pixelation = match source {
            Some(source) => self.pixelate(source, config).await?,
            None => Pixelation::empty(),
        };

        let latest = self.latest();
        if latest != ticket {
            warn!("discarding pass {:?}: superseded by {:?}", ticket, latest);
            return Ok(PassOutcome::Superseded { ticket, latest });
        }

        Ok(PassOutcome::Current(pixelation))
    }

    async fn pixelate(&self, source: SharedSource, config: &PixelationConfig) -> Result<Pixelation> {
        if config.grid_size == 0 {
            return Err(PixelateError::ZeroGridSize);
        }

        let (image_width, image_height) = (source.width(), source.height());
        let blocks = grid_manager::partition(image_width, image_height, config.grid_size);

        let batch_count = self.worker_pool.worker_count() * BATCHES_PER_WORKER;
        let batch_size = blocks.len().div_ceil(batch_count).max(1);
        let batches: Vec<Vec<Block>> = blocks.chunks(batch_size).map(<[Block]>::to_vec).collect();

        debug!(
            "dispatching {} blocks in {} batches to {} workers",
            blocks.len(),
            batches.len(),
            self.worker_pool.worker_count()
        );

        let results = join_all(batches.into_iter().map(|batch| {
            self.worker_pool
                .color(Arc::clone(&source), config.interpolator, batch)
        }))
        .await;

        let mut usage = ColorUsage::new();
        let mut blocks = blocks.into_iter();
        for colors in results {
            for (color, block) in colors?.into_iter().zip(blocks.by_ref()) {
                usage.assign(color, block);
            }
        }

        Ok(Pixelation {
            image_width,
            image_height,
            grid_size: config.grid_size,
            usage,
            grid_lines: pipeline::overlay(image_width, image_height, config),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::render;
    use image::{Rgba, RgbaImage};

    fn noisy_image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            let v = (x * 31 + y * 17) % 5;
            Rgba([(v * 60) as u8, (v * 20) as u8, 255 - (v * 50) as u8, 255])
        })
    }

    #[tokio::test]
    async fn matches_the_synchronous_engine() {
        let image = noisy_image(97, 61);
        let source: SharedSource = Arc::new(image.clone());
        let pixelator = ParallelPixelator::with_workers(3);

        for interpolator in Interpolator::ALL {
            let config = PixelationConfig {
                grid_size: 7,
                interpolator,
                draw_grid: true,
            };
            let expected = render(Some(&image), &config).expect("renders");
            let outcome = pixelator
                .render(Some(Arc::clone(&source)), &config)
                .await
                .expect("renders");

            assert_eq!(outcome, PassOutcome::Current(expected), "{interpolator}");
        }
    }

    #[tokio::test]
    async fn palette_tie_order_survives_batching() {
        let image = noisy_image(64, 64);
        let source: SharedSource = Arc::new(image.clone());
        let config = PixelationConfig {
            grid_size: 4,
            interpolator: Interpolator::DominantPixel,
            draw_grid: false,
        };

        let expected = render(Some(&image), &config).expect("renders").palette();
        let parallel = ParallelPixelator::with_workers(8)
            .render(Some(source), &config)
            .await
            .expect("renders")
            .into_current()
            .expect("only pass");

        assert_eq!(parallel.palette(), expected);
    }

    #[tokio::test]
    async fn older_pass_is_superseded() {
        let source: SharedSource = Arc::new(noisy_image(32, 32));
        let pixelator = ParallelPixelator::with_workers(2);
        let config = PixelationConfig::default();

        let first = pixelator.begin_pass();
        let second = pixelator.begin_pass();

        let stale = pixelator
            .run_pass(first, Some(Arc::clone(&source)), &config)
            .await
            .expect("renders");
        assert_eq!(
            stale,
            PassOutcome::Superseded {
                ticket: first,
                latest: second
            }
        );

        let fresh = pixelator
            .run_pass(second, Some(source), &config)
            .await
            .expect("renders");
        assert!(fresh.into_current().is_some());
    }

    #[tokio::test]
    async fn no_image_is_an_empty_current_pass() {
        let pixelator = ParallelPixelator::with_workers(1);
        let outcome = pixelator
            .render(None, &PixelationConfig::default())
            .await
            .expect("no error");
        assert_eq!(outcome, PassOutcome::Current(Pixelation::empty()));
    }

    #[tokio::test]
    async fn zero_grid_size_is_rejected() {
        let source: SharedSource = Arc::new(noisy_image(8, 8));
        let config = PixelationConfig {
            grid_size: 0,
            ..PixelationConfig::default()
        };
        let err = ParallelPixelator::with_workers(1)
            .render(Some(source), &config)
            .await
            .unwrap_err();
        assert_eq!(err, PixelateError::ZeroGridSize);
    }
}
