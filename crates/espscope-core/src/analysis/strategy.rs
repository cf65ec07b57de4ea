//! Image header decoding strategies
//!
//! Strategies are tried in [`HEADER_STRATEGIES`] order and the first one
//! producing fields wins. Each strategy decides on its own whether it
//! applies to the current buffer.

use alloc::string::{String, ToString};

use crate::chip::ChipTag;
use crate::image::{
    decode_image, parse_header_heuristic, ImageError, ImageHeaderFields, ESP_IMAGE_MAGIC,
};

/// A way of recovering image header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStrategy {
    /// Full decode using the detected chip's tables
    Structured,
    /// Fixed-offset parse without chip context
    Heuristic,
}

/// Strategies in priority order
pub const HEADER_STRATEGIES: [HeaderStrategy; 2] =
    [HeaderStrategy::Structured, HeaderStrategy::Heuristic];

impl HeaderStrategy {
    /// Run this strategy
    ///
    /// Returns `Ok(None)` when the strategy does not apply: structured
    /// decoding needs a detected chip, the heuristic needs an unidentified
    /// chip and the image magic.
    pub fn parse(
        self,
        data: &[u8],
        chip: ChipTag<'_>,
    ) -> Result<Option<ImageHeaderFields>, ImageError> {
        match self {
            Self::Structured => {
                let Some(def) = chip.def() else {
                    return Ok(None);
                };
                let info = decode_image(def, data)?;
                Ok(Some(info.header_fields(def)))
            }
            Self::Heuristic => {
                if !chip.is_unknown() || data.first() != Some(&ESP_IMAGE_MAGIC) {
                    return Ok(None);
                }
                parse_header_heuristic(data).map(Some)
            }
        }
    }
}

/// Run strategies in order until one produces fields
///
/// Failures are returned alongside the strategy that produced them so the
/// caller can annotate the report; they do not stop later strategies.
pub(crate) fn run_strategies(
    data: &[u8],
    chip: ChipTag<'_>,
    mut on_error: impl FnMut(HeaderStrategy, String),
) -> Option<ImageHeaderFields> {
    for strategy in HEADER_STRATEGIES {
        match strategy.parse(data, chip) {
            Ok(Some(fields)) => {
                log::debug!("{:?} header strategy succeeded", strategy);
                return Some(fields);
            }
            Ok(None) => {}
            Err(e) => {
                log::debug!("{:?} header strategy failed: {}", strategy, e);
                on_error(strategy, e.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::{find_by_name, CHIP_DEFS};

    const HEADER: [u8; 8] = [ESP_IMAGE_MAGIC, 0, 3, 0x2F, 0, 0, 0, 0];

    #[test]
    fn test_structured_needs_detected_chip() {
        assert_eq!(
            HeaderStrategy::Structured.parse(&HEADER, ChipTag::Unknown),
            Ok(None)
        );
    }

    #[test]
    fn test_heuristic_skipped_for_known_chip() {
        let esp32 = find_by_name(CHIP_DEFS, "esp32").unwrap();
        assert_eq!(
            HeaderStrategy::Heuristic.parse(&HEADER, ChipTag::Detected(esp32)),
            Ok(None)
        );
        assert_eq!(
            HeaderStrategy::Heuristic.parse(&HEADER, ChipTag::Guessed("ESP32")),
            Ok(None)
        );
    }

    #[test]
    fn test_heuristic_needs_magic() {
        let mut data = HEADER;
        data[0] = 0;
        assert_eq!(HeaderStrategy::Heuristic.parse(&data, ChipTag::Unknown), Ok(None));
    }

    #[test]
    fn test_structured_failure_reported() {
        let esp32 = find_by_name(CHIP_DEFS, "esp32").unwrap();
        let mut errors = std::vec::Vec::new();
        let fields = run_strategies(&HEADER, ChipTag::Detected(esp32), |s, e| errors.push((s, e)));
        assert!(fields.is_none());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, HeaderStrategy::Structured);
    }

    #[test]
    fn test_heuristic_used_for_unknown_chip() {
        let fields = run_strategies(&HEADER, ChipTag::Unknown, |_, _| panic!("no error expected"));
        let fields = fields.unwrap();
        assert_eq!(fields.flash_mode.to_string(), "DOUT");
        assert_eq!(fields.flash_freq, "80MHz");
        assert_eq!(fields.flash_size_raw, Some(2));
    }
}
