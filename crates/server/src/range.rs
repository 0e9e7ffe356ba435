/// Inclusive byte span of a single-range `Range` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn content_range(&self, size: u64) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// Header is malformed or asks for several ranges; serve the whole body.
    Invalid,
    /// Well-formed but outside the object; answer 416.
    Unsatisfiable,
}

pub fn parse_range_header(value: &str, size: u64) -> Result<ByteRange, RangeError> {
    let range_set = value
        .trim()
        .strip_prefix("bytes=")
        .ok_or(RangeError::Invalid)?
        .trim();
    if range_set.contains(',') {
        return Err(RangeError::Invalid);
    }
    let (first, last) = range_set.split_once('-').ok_or(RangeError::Invalid)?;
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        let suffix: u64 = last.parse().map_err(|_| RangeError::Invalid)?;
        if suffix == 0 || size == 0 {
            return Err(RangeError::Unsatisfiable);
        }
        return Ok(ByteRange {
            start: size.saturating_sub(suffix),
            end: size - 1,
        });
    }

    let start: u64 = first.parse().map_err(|_| RangeError::Invalid)?;
    let end = if last.is_empty() {
        None
    } else {
        Some(last.parse::<u64>().map_err(|_| RangeError::Invalid)?)
    };
    if let Some(end) = end {
        if end < start {
            return Err(RangeError::Invalid);
        }
    }
    if start >= size {
        return Err(RangeError::Unsatisfiable);
    }

    Ok(ByteRange {
        start,
        end: end.map_or(size - 1, |end| end.min(size - 1)),
    })
}
