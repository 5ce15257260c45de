use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::classify::Orientation;
use crate::shape::ShapeRules;

/// Tables to process, as 1-based id ranges in document order. Ranges stay
/// unexpanded, so `1-99999999999` costs the same as `1-3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSelection {
    ranges: Vec<RangeInclusive<usize>>,
}

impl TableSelection {
    #[must_use]
    pub fn contains(&self, table_id: usize) -> bool {
        self.ranges.iter().any(|range| range.contains(&table_id))
    }
}

fn parse_table_id(raw: &str, token: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(format!("'{token}': table ids start at 1")),
        Ok(id) => Ok(id),
        Err(_) => Err(format!("'{token}': '{}' is not a table id", raw.trim())),
    }
}

impl FromStr for TableSelection {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let ranges = spec
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| {
                let (first, last) = match token.split_once('-') {
                    Some((first, last)) => (
                        parse_table_id(first, token)?,
                        parse_table_id(last, token)?,
                    ),
                    None => {
                        let id = parse_table_id(token, token)?;
                        (id, id)
                    }
                };
                if last < first {
                    return Err(format!("'{token}': range runs backwards"));
                }
                Ok(first..=last)
            })
            .collect::<Result<Vec<_>, String>>()?;

        if ranges.is_empty() {
            return Err("select at least one table".to_string());
        }

        Ok(Self { ranges })
    }
}

/// Header orientations the classifier may report. Checks always run in the
/// fixed order top, left, right, bottom regardless of how the set was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientationSet {
    enabled: BTreeSet<Orientation>,
}

impl OrientationSet {
    /// Enabled orientations in check order.
    pub fn iter(&self) -> impl Iterator<Item = Orientation> + '_ {
        Orientation::CANDIDATES
            .into_iter()
            .filter(|orientation| self.contains(*orientation))
    }

    #[must_use]
    pub fn contains(&self, orientation: Orientation) -> bool {
        self.enabled.contains(&orientation)
    }
}

impl Default for OrientationSet {
    fn default() -> Self {
        Self {
            enabled: Orientation::CANDIDATES.into_iter().collect(),
        }
    }
}

impl FromStr for OrientationSet {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut enabled = BTreeSet::new();
        for token in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let orientation: Orientation = token.parse()?;
            if !orientation.is_genuine() {
                return Err(format!("'{token}' is not a header orientation"));
            }
            enabled.insert(orientation);
        }

        if enabled.is_empty() {
            return Err("orientation set cannot be empty".to_string());
        }

        Ok(Self { enabled })
    }
}

impl fmt::Display for OrientationSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.iter().map(Orientation::as_str).collect::<Vec<_>>();
        f.write_str(&names.join(","))
    }
}

/// How the positions covered by a merged cell are rendered in flat output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergedFill {
    /// Value at the top-left position only; the rest stays blank.
    #[default]
    Anchor,
    /// Value repeated in every covered position.
    Repeat,
}

impl MergedFill {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anchor => "anchor",
            Self::Repeat => "repeat",
        }
    }
}

impl FromStr for MergedFill {
    type Err = String;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        match spec.trim().to_ascii_lowercase().as_str() {
            "anchor" => Ok(Self::Anchor),
            "repeat" => Ok(Self::Repeat),
            other => Err(format!(
                "invalid merged fill '{other}', expected anchor or repeat"
            )),
        }
    }
}

impl fmt::Display for MergedFill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub tables: Option<TableSelection>,
    pub orientations: OrientationSet,
    pub shape_rules: ShapeRules,
    pub delimiter: u8,
    pub fill: MergedFill,
    pub no_table: bool,
    pub no_orientation: bool,
    pub encoding: Option<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            tables: None,
            orientations: OrientationSet::default(),
            shape_rules: ShapeRules::default(),
            delimiter: b',',
            fill: MergedFill::Anchor,
            no_table: false,
            no_orientation: false,
            encoding: None,
        }
    }
}
