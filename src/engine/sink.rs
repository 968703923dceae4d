use rtrb::Producer;

/// Destination for blocks produced by a [`super::BlockRunner`].
///
/// Called on the runner thread once per block, so implementations should
/// not block for longer than a block period.
pub trait BlockSink: Send + 'static {
    fn write_block(&mut self, block: &[f32]);
}

/// Discards every block. Stands in for an output device that is missing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl BlockSink for NullSink {
    fn write_block(&mut self, _block: &[f32]) {}
}

/// Collects every sample (offline rendering).
impl BlockSink for Vec<f32> {
    fn write_block(&mut self, block: &[f32]) {
        self.extend_from_slice(block);
    }
}

/// Forwards samples to another thread, dropping the remainder of a block
/// when the ring is full.
impl BlockSink for Producer<f32> {
    fn write_block(&mut self, block: &[f32]) {
        for &s in block {
            if self.push(s).is_err() {
                break;
            }
        }
    }
}
