//! Activation relay: copies a fixed-width slice of a source model's internal
//! stage into a target input buffer.

use crate::error::{DriftError, Result};
use crate::model::NeuralModel;
use drift_data::LinkDescriptor;

/// Per-tick activation slice, always exactly `link.width` long.
pub type ActivationBuffer = Vec<f32>;

/// Pulls `link.width` values from `link.source_stage` after running `source`
/// on `input`.
///
/// A disabled link returns zeros without running the source model. Narrow
/// stages are zero-padded, wide stages truncated.
pub fn relay<M: NeuralModel + ?Sized>(
    link: &LinkDescriptor,
    source: &mut M,
    input: &[f32],
) -> Result<ActivationBuffer> {
    let mut buffer = vec![0.0; link.width];
    if !link.enabled {
        return Ok(buffer);
    }

    source.forward(input)?;
    let stage = source.internal_stage(link.source_stage).ok_or_else(|| {
        DriftError::execution(format!(
            "link '{}': source stage {} unavailable after forward",
            link.name, link.source_stage
        ))
    })?;
    let n = stage.len().min(link.width);
    buffer[..n].copy_from_slice(&stage[..n]);
    Ok(buffer)
}

/// Writes `buffer` into `composite` at the link's target offset.
pub fn inject(link: &LinkDescriptor, buffer: &[f32], composite: &mut [f32]) -> Result<()> {
    let range = link.target_range();
    let composite_len = composite.len();
    let slot = composite.get_mut(range.clone()).ok_or_else(|| {
        DriftError::execution(format!(
            "link '{}' range {:?} exceeds composite input of {}",
            link.name, range, composite_len
        ))
    })?;
    let n = buffer.len().min(slot.len());
    slot[..n].copy_from_slice(&buffer[..n]);
    Ok(())
}
