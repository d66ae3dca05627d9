use crate::error::{Error, Result};

pub const BLOCK_SIZE: usize = 512;

/// Root directory every registry tarball stores the package under.
pub const PACKAGE_ROOT: &str = "package/";

const NAME_FIELD: std::ops::Range<usize> = 0..100;
const SIZE_FIELD: std::ops::Range<usize> = 124..136;

/// Find `package/<subpath>` in an uncompressed ustar buffer.
///
/// Headers whose size field holds no octal digits are stepped over one block
/// at a time; this is how zero-filled trailer blocks are skipped.
pub fn find_entry<'a>(tarball: &'a [u8], subpath: &str) -> Result<&'a [u8]> {
    let target = format!("{PACKAGE_ROOT}{subpath}");
    let mut offset = 0;

    while offset < tarball.len() {
        let header = &tarball[offset..tarball.len().min(offset + BLOCK_SIZE)];
        let name = field(header, NAME_FIELD);
        let size = parse_octal(field(header, SIZE_FIELD));
        offset += BLOCK_SIZE;

        let Some(size) = size else {
            continue;
        };
        if name == target.as_bytes() {
            let end = offset.checked_add(size).filter(|end| *end <= tarball.len());
            return match end {
                Some(end) => Ok(&tarball[offset..end]),
                None => Err(Error::Corrupted {
                    reason: format!("`{target}` claims {size} bytes past the end of the archive"),
                }),
            };
        }
        offset = offset.saturating_add(padded(size));
    }

    Err(Error::NotFound { path: target })
}

/// Bytes of a header field up to its first NUL.
fn field(header: &[u8], range: std::ops::Range<usize>) -> &[u8] {
    let start = range.start.min(header.len());
    let end = range.end.min(header.len());
    let bytes = &header[start..end];
    match bytes.iter().position(|b| *b == 0) {
        Some(nul) => &bytes[..nul],
        None => bytes,
    }
}

/// Leading-whitespace-tolerant octal, stopping at the first non-octal byte.
fn parse_octal(bytes: &[u8]) -> Option<usize> {
    let digits: Vec<u8> = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .take_while(|b| (b'0'..=b'7').contains(*b))
        .copied()
        .collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.iter().fold(0usize, |acc, digit| {
        acc.saturating_mul(8).saturating_add(usize::from(digit - b'0'))
    }))
}

fn padded(size: usize) -> usize {
    size.div_ceil(BLOCK_SIZE).saturating_mul(BLOCK_SIZE)
}
