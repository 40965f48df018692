use crate::models::enums::MatchFormat;
use crate::pipeline::notation::{BAR, BEAR_OFF};

/// How a source format numbers points in its sub-move records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointEncoding {
    /// Added to a native point number to reach universal numbering.
    pub offset: i32,
    /// Native value of the bar.
    pub bar: i32,
    /// Native value of a borne-off destination.
    pub off: i32,
    /// Native `from` value filling unused sub-move slots.
    pub padding: Option<i32>,
}

const XG: PointEncoding = PointEncoding { offset: 0, bar: 25, off: -2, padding: Some(-1) };
const GNUBG_SGF: PointEncoding = PointEncoding { offset: 1, bar: 24, off: -1, padding: None };
const GNUBG_MAT: PointEncoding = PointEncoding { offset: 0, bar: 25, off: 0, padding: None };
const BGF: PointEncoding = PointEncoding { offset: 0, bar: 25, off: 0, padding: Some(-1) };

impl PointEncoding {
    pub fn for_format(format: MatchFormat) -> Self {
        match format {
            MatchFormat::Xg => XG,
            MatchFormat::GnubgSgf => GNUBG_SGF,
            MatchFormat::GnubgMat | MatchFormat::GnubgText => GNUBG_MAT,
            MatchFormat::Bgf => BGF,
        }
    }

    fn point(&self, native: i32) -> i32 {
        if native == self.bar {
            BAR
        } else if native == self.off {
            BEAR_OFF
        } else {
            native + self.offset
        }
    }

    /// Universal pair for one native sub-move, `None` for padding. Values
    /// outside the table pass through shifted and are left for the
    /// notation layer to reject.
    pub fn translate(&self, from: i32, to: i32) -> Option<(i32, i32)> {
        if self.padding == Some(from) {
            return None;
        }
        Some((self.point(from), self.point(to)))
    }

    pub fn translate_all<I>(&self, pairs: I) -> Vec<(i32, i32)>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        pairs
            .into_iter()
            .filter_map(|(from, to)| self.translate(from, to))
            .collect()
    }
}
