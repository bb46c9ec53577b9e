//! Shrink-to-fit search over font sizes.
//!
//! Candidate sizes form a lattice `start - k * step` for `k = 0, 1, ...`
//! bounded below by [`FitConfig::min_font_size`]. The search picks the
//! largest candidate whose paragraph is no taller than the box. Both
//! strategies walk the same lattice, so they agree whenever the shaper is
//! monotonic in font size.

use crate::{
    error::{RenderError, Result},
    text::{Paragraph, ParagraphStyle, ShapedLine, TextShaper},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How candidate sizes are visited.
pub enum FitStrategy {
    /// Try `start`, then `start - step`, and so on.
    ///
    /// Costs one `shape` call per skipped size, so a start size far above
    /// what the box can hold (say `1e6` into a 50px box) makes about
    /// `(start - fitted) / step` calls. Use [`FitStrategy::Bisect`] when
    /// start sizes are not bounded by the caller.
    #[default]
    StepDown,
    /// Binary search over the candidate lattice, at most about
    /// `log2((start - min_font_size) / step) + 2` `shape` calls.
    Bisect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// What happens when even the smallest candidate is too tall.
pub enum OverflowPolicy {
    /// Return the floor-size layout, marked as overflowed.
    #[default]
    Accept,
    /// Return [`RenderError::TextDoesNotFit`].
    Fail,
}

/// Knobs for [`fit_text`].
///
/// The default walks down one unit at a time, which is linear in the gap
/// between the start size and the fitted size; see [`FitStrategy`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitConfig {
    pub min_font_size: f32,
    pub step: f32,
    pub strategy: FitStrategy,
    pub overflow: OverflowPolicy,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_font_size: 1.0,
            step: 1.0,
            strategy: FitStrategy::StepDown,
            overflow: OverflowPolicy::Accept,
        }
    }
}

impl FitConfig {
    fn validate(&self) -> Result<()> {
        if !self.min_font_size.is_finite() || self.min_font_size <= 0.0 {
            return Err(RenderError::InvalidConfig("min_font_size must be positive"));
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(RenderError::InvalidConfig("step must be positive"));
        }
        Ok(())
    }
}

/// Result of the shrink search.
///
/// `measured_height <= box_height` unless `overflowed` is set, in which case
/// `font_size` is the smallest candidate the search was allowed to try.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedLayout {
    pub font_size: f32,
    pub measured_height: u32,
    pub overflowed: bool,
    /// Number of `shape` calls the search made.
    pub attempts: u32,
    pub paragraph: Paragraph,
}

impl FittedLayout {
    pub fn lines(&self) -> &[ShapedLine] {
        &self.paragraph.lines
    }
}

/// Finds the largest font size at or below `start_font_size` at which `text`,
/// wrapped to `box_width`, is at most `box_height` pixels tall.
pub fn fit_text<S: TextShaper + ?Sized>(
    shaper: &mut S,
    text: &str,
    font_id: fontdb::ID,
    start_font_size: f32,
    box_width: u32,
    box_height: u32,
    config: &FitConfig,
) -> Result<FittedLayout> {
    config.validate()?;
    if !start_font_size.is_finite() || start_font_size <= 0.0 {
        return Err(RenderError::InvalidFontSize(start_font_size));
    }
    if box_width == 0 || box_height == 0 {
        return Err(RenderError::EmptyBox {
            width: box_width,
            height: box_height,
        });
    }

    let mut search = Search {
        shaper,
        text,
        font_id,
        start_font_size,
        step: config.step,
        box_height,
        style: ParagraphStyle::centered(box_width as f32),
        attempts: 0,
    };

    let last_step = if start_font_size > config.min_font_size {
        ((start_font_size - config.min_font_size) / config.step).floor() as u32
    } else {
        0
    };

    let (paragraph, fits) = match config.strategy {
        FitStrategy::StepDown => search.step_down(last_step)?,
        FitStrategy::Bisect => search.bisect(last_step)?,
    };

    let measured_height = paragraph.measured_height();
    let font_size = paragraph.font_size;
    let attempts = search.attempts;

    if !fits {
        match config.overflow {
            OverflowPolicy::Accept => {
                log::warn!(
                    "text does not fit {box_width}x{box_height} even at size {font_size}; \
                     accepting {measured_height}px"
                );
            }
            OverflowPolicy::Fail => {
                return Err(RenderError::TextDoesNotFit {
                    font_size,
                    measured_height,
                    box_height,
                });
            }
        }
    }

    log::debug!(
        "fitted size {font_size} (start {start_font_size}) height {measured_height}/{box_height} \
         after {attempts} attempts"
    );

    Ok(FittedLayout {
        font_size,
        measured_height,
        overflowed: !fits,
        attempts,
        paragraph,
    })
}

struct Search<'a, S: TextShaper + ?Sized> {
    shaper: &'a mut S,
    text: &'a str,
    font_id: fontdb::ID,
    start_font_size: f32,
    step: f32,
    box_height: u32,
    style: ParagraphStyle,
    attempts: u32,
}

impl<S: TextShaper + ?Sized> Search<'_, S> {
    fn size_at(&self, k: u32) -> f32 {
        self.start_font_size - k as f32 * self.step
    }

    fn shape_at(&mut self, k: u32) -> Result<(Paragraph, bool)> {
        let size = self.size_at(k);
        self.attempts += 1;
        let paragraph = self
            .shaper
            .shape(self.text, self.font_id, size, &self.style)?;
        let fits = paragraph.measured_height() <= self.box_height;
        log::trace!(
            "size {size}: {}px, fits={fits}",
            paragraph.measured_height()
        );
        Ok((paragraph, fits))
    }

    fn step_down(&mut self, last_step: u32) -> Result<(Paragraph, bool)> {
        let mut k = 0;
        loop {
            let (paragraph, fits) = self.shape_at(k)?;
            if fits || k >= last_step {
                return Ok((paragraph, fits));
            }
            k += 1;
        }
    }

    fn bisect(&mut self, last_step: u32) -> Result<(Paragraph, bool)> {
        let first = self.shape_at(0)?;
        if first.1 || last_step == 0 {
            return Ok(first);
        }

        let floor = self.shape_at(last_step)?;
        if !floor.1 {
            return Ok(floor);
        }

        // invariant: `lo` does not fit, `hi` fits
        let (mut lo, mut hi) = (0u32, last_step);
        let mut best = floor.0;
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            let (paragraph, fits) = self.shape_at(mid)?;
            if fits {
                hi = mid;
                best = paragraph;
            } else {
                lo = mid;
            }
        }

        Ok((best, true))
    }
}
