use crate::{
    DIMENSION_BYTES,
    MAX_DIMENSION,
    VideoError,
    VideoResult,
};

/// Splits `dimension` into 8 bytes that sum back to it.
///
/// The value is spread evenly over the fewest bytes that can hold it, with the
/// remainder going to the leading bytes, e.g. `300 -> [150, 150, 0, ..]`.
pub fn encode(dimension: usize) -> VideoResult<[u8; DIMENSION_BYTES]>
{
    if dimension > MAX_DIMENSION
    {
        return Err(VideoError::DimensionOverflow(dimension));
    }

    let mut bytes = [0u8; DIMENSION_BYTES];
    if dimension == 0
    {
        return Ok(bytes);
    }

    let count = dimension.div_ceil(u8::MAX as usize);
    let base = dimension / count;
    let remainder = dimension % count;

    for (i, byte) in bytes.iter_mut().take(count).enumerate()
    {
        // base + 1 <= 255 whenever remainder > 0, since count was rounded up
        *byte = (base + usize::from(i < remainder)) as u8;
    }
    Ok(bytes)
}

/// Sums the 8 bytes; any split of the same value decodes the same.
pub fn decode(bytes: &[u8; DIMENSION_BYTES]) -> usize
{
    bytes.iter().map(|&b| b as usize).sum()
}
