//! Offline rendering through a signal chain.

use bloodless_effects::{ChainError, SignalChain};

use crate::{Result, StereoSamples};

/// Levels after one rendered block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockReport {
    /// Block number, from zero.
    pub index: usize,
    /// Frames rendered so far, this block included.
    pub frames_done: usize,
    /// Frames in the whole input.
    pub frames_total: usize,
    /// Dry RMS of this block in dB.
    pub dry_db: f32,
    /// Wet (post-compression) RMS of this block in dB.
    pub wet_db: f32,
}

/// Level statistics of a whole render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSummary {
    /// Frames rendered.
    pub frames: usize,
    /// Blocks rendered.
    pub blocks: usize,
    /// Mean of the per-block dry levels.
    pub mean_dry_db: f32,
    /// Mean of the per-block wet levels.
    pub mean_wet_db: f32,
    /// Loudest dry block.
    pub max_dry_db: f32,
    /// Loudest wet block.
    pub max_wet_db: f32,
}

/// Drives a [`SignalChain`] over whole buffers in fixed-size blocks.
///
/// The chain state persists across [`render`](Self::render) calls; call
/// [`reset`](Self::reset) between unrelated inputs.
#[derive(Debug)]
pub struct OfflineRenderer {
    chain: SignalChain,
    block_size: usize,
}

impl OfflineRenderer {
    /// Wrap a chain, rendering `block_size` frames per call.
    pub fn new(chain: SignalChain, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(ChainError::ZeroBlockSize.into());
        }
        tracing::debug!(block_size, sample_rate = chain.config().sample_rate, "offline renderer ready");
        Ok(Self { chain, block_size })
    }

    /// Frames per rendered block.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// The wrapped chain.
    pub fn chain(&self) -> &SignalChain {
        &self.chain
    }

    /// Clear compressor and filter state.
    pub fn reset(&mut self) {
        self.chain.reset();
    }

    /// Unwrap the chain.
    pub fn into_chain(self) -> SignalChain {
        self.chain
    }

    /// Render `input` into a new buffer, calling `on_block` after each block.
    pub fn render(
        &mut self,
        input: &StereoSamples,
        mut on_block: impl FnMut(&BlockReport),
    ) -> (StereoSamples, RenderSummary) {
        let mut output = input.clone();
        let frames_total = output.len();

        let mut blocks = 0;
        let mut frames_done = 0;
        let mut dry_sum = 0.0f64;
        let mut wet_sum = 0.0f64;
        let mut max_dry_db = f32::NEG_INFINITY;
        let mut max_wet_db = f32::NEG_INFINITY;

        for (left, right) in output
            .left
            .chunks_mut(self.block_size)
            .zip(output.right.chunks_mut(self.block_size))
        {
            self.chain.process(left, right);

            let dry_db = self.chain.dry_rms_db();
            let wet_db = self.chain.wet_rms_db();
            dry_sum += f64::from(dry_db);
            wet_sum += f64::from(wet_db);
            max_dry_db = max_dry_db.max(dry_db);
            max_wet_db = max_wet_db.max(wet_db);
            frames_done += left.len();

            on_block(&BlockReport {
                index: blocks,
                frames_done,
                frames_total,
                dry_db,
                wet_db,
            });
            blocks += 1;
        }

        let floor = self.chain.config().meter_range.floor_db;
        let summary = if blocks == 0 {
            RenderSummary {
                frames: 0,
                blocks: 0,
                mean_dry_db: floor,
                mean_wet_db: floor,
                max_dry_db: floor,
                max_wet_db: floor,
            }
        } else {
            RenderSummary {
                frames: frames_done,
                blocks,
                mean_dry_db: (dry_sum / blocks as f64) as f32,
                mean_wet_db: (wet_sum / blocks as f64) as f32,
                max_dry_db,
                max_wet_db,
            }
        };
        tracing::debug!(?summary, "render finished");
        (output, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodless_effects::{ChainConfig, ParameterStore};
    use std::sync::Arc;

    fn renderer(block_size: usize) -> (OfflineRenderer, Arc<ParameterStore>) {
        let params = Arc::new(ParameterStore::new());
        let (chain, _taps) = SignalChain::new(ChainConfig::new(48000.0), Arc::clone(&params)).unwrap();
        (OfflineRenderer::new(chain, block_size).unwrap(), params)
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let params = Arc::new(ParameterStore::new());
        let (chain, _taps) = SignalChain::new(ChainConfig::new(48000.0), params).unwrap();
        assert!(matches!(
            OfflineRenderer::new(chain, 0),
            Err(crate::Error::Chain(ChainError::ZeroBlockSize))
        ));
    }

    #[test]
    fn test_reports_every_block() {
        let (mut renderer, _) = renderer(100);
        let input = StereoSamples::from_mono(vec![0.3; 250]);
        let mut reports = Vec::new();
        let (output, summary) = renderer.render(&input, |r| reports.push(*r));

        assert_eq!(output.len(), 250);
        assert_eq!(summary.blocks, 3);
        assert_eq!(summary.frames, 250);
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[2].frames_done, 250);
        assert_eq!(reports[2].frames_total, 250);
        assert!(reports.iter().enumerate().all(|(i, r)| r.index == i));
    }

    #[test]
    fn test_bypass_renders_identity() {
        let (mut renderer, params) = renderer(64);
        params.set_bypass(true);
        let input = StereoSamples::new(
            (0..300).map(|i| (i as f32 * 0.05).sin()).collect(),
            (0..300).map(|i| (i as f32 * 0.07).cos()).collect(),
        );
        let (output, _) = renderer.render(&input, |_| {});
        assert_eq!(output, input);
    }

    #[test]
    fn test_empty_input_reports_floor() {
        let (mut renderer, _) = renderer(64);
        let (output, summary) = renderer.render(&StereoSamples::default(), |_| {});
        assert!(output.is_empty());
        assert_eq!(summary.blocks, 0);
        assert_eq!(summary.mean_dry_db, -60.0);
    }
}
